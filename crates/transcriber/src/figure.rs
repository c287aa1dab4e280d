//! Snapping a gap between two hits to the nearest written duration.
//!
//! Candidates are enumerated per subdivision (whole down to sixteenth of the
//! reference note) as plain, then triplet, then dotted. The first candidate
//! with the strictly smallest distance wins, so on an exact tie the earlier
//! candidate in that order is kept. Transcriptions of ambiguous gaps depend
//! on this order.

/// Multiples of the reference note tried for every gap, longest first.
const SUBDIVISIONS: [f64; 5] = [4.0, 2.0, 1.0, 0.5, 0.25];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FigureKind {
    Plain,
    Triplet,
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FigureCandidate {
    pub kind: FigureKind,
    /// Length in quarter notes.
    pub figure: f64,
    /// Length in seconds at the grid's reference duration.
    pub seconds: f64,
}

/// Every candidate in evaluation order.
///
/// Triplets are only offered against a quarter-note reference, and their
/// figure is not rescaled by the reference note.
pub fn candidates(
    reference_note: u32,
    reference_duration: f64,
) -> impl Iterator<Item = FigureCandidate> {
    let correction = reference_note as f64 / 4.0;
    SUBDIVISIONS.into_iter().flat_map(move |subdiv| {
        let plain = FigureCandidate {
            kind: FigureKind::Plain,
            figure: subdiv / correction,
            seconds: subdiv * reference_duration,
        };
        let triplet = (reference_note == 4).then(|| {
            let triplet = subdiv / 3.0;
            FigureCandidate {
                kind: FigureKind::Triplet,
                figure: triplet,
                seconds: triplet * reference_duration,
            }
        });
        let dotted = subdiv + 0.5 * subdiv;
        let dotted = FigureCandidate {
            kind: FigureKind::Dotted,
            figure: dotted / correction,
            seconds: dotted * reference_duration,
        };
        [Some(plain), triplet, Some(dotted)].into_iter().flatten()
    })
}

/// Closest candidate to a gap of `dt` seconds. `None` only when no distance
/// is comparable, e.g. `dt` is NaN.
pub fn best_candidate(
    dt: f64,
    reference_note: u32,
    reference_duration: f64,
) -> Option<FigureCandidate> {
    let mut best = None;
    let mut best_distance = f64::INFINITY;
    for candidate in candidates(reference_note, reference_duration) {
        let distance = (dt - candidate.seconds).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate);
        }
    }
    best
}

/// Time-figure (quarter-note units) that best approximates a gap of `dt` seconds
/// on a grid whose reference note lasts `reference_duration` seconds.
pub fn best_figure(dt: f64, reference_note: u32, reference_duration: f64) -> Option<f64> {
    best_candidate(dt, reference_note, reference_duration).map(|candidate| candidate.figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exact_quarter_based_figures() {
        assert_eq!(best_figure(1.0, 4, 1.0), Some(1.0));
        assert_eq!(best_figure(0.5, 4, 1.0), Some(0.5));
        assert_eq!(best_figure(1.5, 4, 1.0), Some(1.5));
        assert_eq!(best_figure(4.0, 4, 1.0), Some(4.0));
        assert_eq!(best_figure(6.0, 4, 1.0), Some(6.0));
        assert_eq!(best_figure(0.25, 4, 1.0), Some(0.25));
    }

    #[test]
    fn noisy_gaps_snap_to_triplets() {
        assert_relative_eq!(best_figure(0.333, 4, 1.0).unwrap(), 1.0 / 3.0);
        assert_relative_eq!(best_figure(0.68, 4, 1.0).unwrap(), 2.0 / 3.0);
        let candidate = best_candidate(0.17, 4, 1.0).unwrap();
        assert_eq!(candidate.kind, FigureKind::Triplet);
        assert_relative_eq!(candidate.figure, 0.5 / 3.0);
    }

    #[test]
    fn scales_with_reference_duration() {
        // 120 bpm quarter grid
        assert_eq!(best_figure(0.26, 4, 0.5), Some(0.5));
        assert_eq!(best_figure(0.74, 4, 0.5), Some(1.5));
    }

    #[test]
    fn eighth_note_reference_rescales_figures() {
        // One eighth note on an eighth-note grid is half a quarter.
        assert_eq!(best_figure(1.0, 8, 1.0), Some(0.5));
        assert_eq!(best_figure(3.0, 8, 1.0), Some(1.5));
        assert_eq!(best_figure(0.5, 2, 1.0), Some(1.0));
    }

    #[test]
    fn triplets_only_against_quarter_reference() {
        assert!(candidates(8, 1.0).all(|c| c.kind != FigureKind::Triplet));
        assert_eq!(candidates(8, 1.0).count(), 10);
        assert_eq!(candidates(4, 1.0).count(), 15);
        // a third of an eighth lands on the dotted sixteenth-of-reference
        assert_eq!(best_figure(0.333, 8, 1.0), Some(0.1875));
    }

    #[test]
    fn evaluation_order() {
        let kinds: Vec<FigureKind> = candidates(4, 1.0).take(3).map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![FigureKind::Plain, FigureKind::Triplet, FigureKind::Dotted]
        );
        let seconds: Vec<f64> = candidates(4, 1.0)
            .filter(|c| c.kind == FigureKind::Plain)
            .map(|c| c.seconds)
            .collect();
        assert_eq!(seconds, vec![4.0, 2.0, 1.0, 0.5, 0.25]);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        // 1.25s sits exactly between plain 1.0s and dotted 1.5s; plain comes first.
        assert_eq!(best_figure(1.25, 8, 1.0), Some(0.5));
        // 5.0s sits exactly between plain 4.0s and dotted 6.0s.
        assert_eq!(best_figure(5.0, 4, 1.0), Some(4.0));
        // 1.0625s sits between the quarter-subdivision triplet (1.0s) and the
        // sixteenth-subdivision dotted (1.125s); the triplet is evaluated first.
        let candidate = best_candidate(1.0625, 4, 3.0).unwrap();
        assert_eq!(candidate.kind, FigureKind::Triplet);
        assert_relative_eq!(candidate.figure, 1.0 / 3.0);
    }

    #[test]
    fn nan_gap_has_no_figure() {
        assert_eq!(best_figure(f64::NAN, 4, 1.0), None);
    }
}
