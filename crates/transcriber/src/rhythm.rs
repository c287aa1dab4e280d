//! Rhythm transcription: turns the gaps between consecutive hits into note
//! and rest figures that fill every measure exactly.

use snare_domain::{figure_is_close, TimeSignature, TranscribedEvent, FIGURE_RTOL};
use tracing::trace;

use crate::error::TranscriptionError;
use crate::figure::best_figure;

/// Onsets must be finite, non-negative and strictly increasing.
pub fn validate_onsets(onsets: &[f64]) -> Result<(), TranscriptionError> {
    for (index, &value) in onsets.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(TranscriptionError::InvalidOnset { index, value });
        }
        if index > 0 && value <= onsets[index - 1] {
            return Err(TranscriptionError::UnorderedOnsets {
                index,
                previous: onsets[index - 1],
                current: value,
            });
        }
    }
    Ok(())
}

/// Round to two decimals, halves to even.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// What a single gap contributes to the event stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    Fits(TranscribedEvent),
    /// The figure crosses the barline: a hit fills the current measure and a
    /// rest carries the remainder into the next one.
    Split {
        hit: TranscribedEvent,
        rest: TranscribedEvent,
    },
}

impl Placement {
    pub fn push_into(self, events: &mut Vec<TranscribedEvent>) {
        match self {
            Placement::Fits(event) => events.push(event),
            Placement::Split { hit, rest } => {
                events.push(hit);
                events.push(rest);
            }
        }
    }
}

/// Place `figure` into a measure already filled up to `acc`.
///
/// Returns the placement and the accumulator for the next gap.
pub fn place_figure(acc: f64, figure: f64, capacity: f64) -> (Placement, f64) {
    let total = round_to_hundredths(acc + figure);
    if total > capacity {
        let hit = capacity - acc;
        let rest = figure - hit;
        let placement = Placement::Split {
            hit: TranscribedEvent::hit(hit),
            rest: TranscribedEvent::rest(rest),
        };
        return (placement, carry_over(rest, capacity));
    }

    let mut acc = acc + figure;
    if figure_is_close(acc, capacity) || acc >= capacity {
        acc = 0.0;
    }
    (Placement::Fits(TranscribedEvent::hit(figure)), acc)
}

/// Accumulator after a rest of `rest` quarters opened a new measure.
///
/// A rest spanning whole measures only leaves its remainder behind, and a
/// rest that lands on a barline leaves nothing.
pub fn carry_over(rest: f64, capacity: f64) -> f64 {
    if figure_is_close(rest, capacity) {
        return 0.0;
    }
    if rest < capacity {
        return rest;
    }
    let wrapped = rest.rem_euclid(capacity);
    if wrapped <= capacity * FIGURE_RTOL || figure_is_close(wrapped, capacity) {
        0.0
    } else {
        wrapped
    }
}

/// Transcribe strictly increasing onset times (seconds) against a metronome
/// grid whose first step is one reference note.
///
/// The last hit has no following onset, so it is given whatever is left of
/// its measure.
pub fn transcribe(
    onsets: &[f64],
    grid: &[f64],
    time_signature: TimeSignature,
) -> Result<Vec<TranscribedEvent>, TranscriptionError> {
    if onsets.len() < 2 {
        return Err(TranscriptionError::InsufficientOnsets(onsets.len()));
    }
    validate_onsets(onsets)?;
    if grid.len() < 2 {
        return Err(TranscriptionError::GridTooShort { len: grid.len() });
    }
    let reference_duration = grid[1] - grid[0];
    if !reference_duration.is_finite() || reference_duration <= 0.0 {
        return Err(TranscriptionError::InvalidGridStep(reference_duration));
    }

    let capacity = time_signature.measure_capacity();
    let reference_note = time_signature.reference_note();
    let mut events = Vec::with_capacity(onsets.len() + 1);

    let acc = onsets
        .windows(2)
        .enumerate()
        .try_fold(0.0, |acc, (index, pair)| {
            let dt = pair[1] - pair[0];
            let figure = best_figure(dt, reference_note, reference_duration).ok_or(
                TranscriptionError::InvalidOnset {
                    index: index + 1,
                    value: pair[1],
                },
            )?;
            let (placement, next) = place_figure(acc, figure, capacity);
            trace!(dt, figure, acc = next, ?placement, "placed gap");
            placement.push_into(&mut events);
            Ok::<_, TranscriptionError>(next)
        })?;

    events.push(TranscribedEvent::hit(capacity - acc));
    Ok(events)
}
