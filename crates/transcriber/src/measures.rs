use crate::error::TranscriptionError;
use crate::rhythm::validate_onsets;

/// Groups onsets into measures of `beats_per_measure` grid steps.
///
/// Window `k` is `[grid[k * n], grid[(k + 1) * n])`. Windows stop once one
/// starts after the last onset; a window whose end point lies past the
/// grid is an error rather than a truncated measure.
pub fn segment(
    onsets: &[f64],
    grid: &[f64],
    beats_per_measure: u32,
) -> Result<Vec<Vec<f64>>, TranscriptionError> {
    if beats_per_measure == 0 {
        return Err(TranscriptionError::EmptyMeasure);
    }
    validate_onsets(onsets)?;
    let Some(&last) = onsets.last() else {
        return Ok(Vec::new());
    };

    let step = beats_per_measure as usize;
    let mut measures = Vec::new();
    for start in (0..grid.len()).step_by(step) {
        let min_t = grid[start];
        if min_t > last {
            break;
        }
        let end = start + step;
        let max_t = *grid.get(end).ok_or(TranscriptionError::GridExhausted {
            needed: end + 1,
            available: grid.len(),
        })?;
        let lo = onsets.partition_point(|t| *t < min_t);
        let hi = onsets.partition_point(|t| *t < max_t);
        measures.push(onsets[lo..hi.max(lo)].to_vec());
    }
    Ok(measures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metronome::generate_grid;

    #[test]
    fn groups_onsets_by_measure() {
        let grid = generate_grid(60.0, 16.0, 4).unwrap();
        let onsets = [0.0, 1.0, 2.5, 3.99, 4.0, 7.5, 8.2];
        let measures = segment(&onsets, &grid, 4).unwrap();
        assert_eq!(
            measures,
            vec![
                vec![0.0, 1.0, 2.5, 3.99],
                vec![4.0, 7.5],
                vec![8.2],
            ]
        );
    }

    #[test]
    fn empty_measures_are_kept() {
        let grid = generate_grid(60.0, 16.0, 4).unwrap();
        let measures = segment(&[0.5, 9.0], &grid, 4).unwrap();
        assert_eq!(measures, vec![vec![0.5], vec![], vec![9.0]]);
    }

    #[test]
    fn stops_after_last_onset() {
        let grid = generate_grid(60.0, 40.0, 4).unwrap();
        let measures = segment(&[0.0, 1.0], &grid, 4).unwrap();
        assert_eq!(measures.len(), 1);
    }

    #[test]
    fn three_beat_measures() {
        let grid = generate_grid(120.0, 6.0, 4).unwrap();
        let measures = segment(&[0.0, 0.5, 1.5, 2.0, 3.1], &grid, 3).unwrap();
        assert_eq!(measures, vec![vec![0.0, 0.5], vec![1.5, 2.0], vec![3.1]]);
    }

    #[test]
    fn reports_exhausted_grid() {
        let grid = generate_grid(60.0, 6.0, 4).unwrap();
        let result = segment(&[0.0, 5.0], &grid, 4);
        assert!(matches!(
            result,
            Err(TranscriptionError::GridExhausted {
                needed: 9,
                available: 6
            })
        ));
    }

    #[test]
    fn empty_onsets_and_bad_input() {
        let grid = generate_grid(60.0, 8.0, 4).unwrap();
        assert!(segment(&[], &grid, 4).unwrap().is_empty());
        assert!(matches!(
            segment(&[0.0], &grid, 0),
            Err(TranscriptionError::EmptyMeasure)
        ));
        assert!(matches!(
            segment(&[1.0, 0.5], &grid, 4),
            Err(TranscriptionError::UnorderedOnsets { index: 1, .. })
        ));
    }
}
