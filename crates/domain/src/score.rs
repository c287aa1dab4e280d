use serde::{Deserialize, Serialize};
use time::Duration;

use crate::events::{figure_is_close, TranscribedEvent, SNARE_MIDI_NOTE};
use crate::{Tempo, TimeSignature};

/// Pieces shorter than this are float residue from barline splits.
const MIN_PIECE: f64 = 1e-6;

/// Single-voice percussion score handed to renderers and exporters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Score {
    pub title: String,
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    /// Unpitched percussion key the hits are played on.
    pub midi_note: u8,
    pub events: Vec<TranscribedEvent>,
}

impl Score {
    pub fn new(
        title: impl Into<String>,
        tempo: Tempo,
        time_signature: TimeSignature,
        events: Vec<TranscribedEvent>,
    ) -> Self {
        Self {
            title: title.into(),
            tempo,
            time_signature,
            midi_note: SNARE_MIDI_NOTE,
            events,
        }
    }

    pub fn with_midi_note(mut self, midi_note: u8) -> Self {
        self.midi_note = midi_note;
        self
    }

    pub fn hit_count(&self) -> usize {
        self.events.iter().filter(|event| !event.is_rest()).count()
    }

    pub fn total_figure(&self) -> f64 {
        self.events.iter().map(TranscribedEvent::figure).sum()
    }

    pub fn total_duration(&self) -> Duration {
        Duration::seconds_f64(self.total_figure() * self.tempo.seconds_per_beat())
    }

    /// Groups events bar by bar. An event crossing a barline is cut into
    /// pieces of the same kind, one per measure it touches. Rest slivers
    /// left by float noise are dropped; every hit keeps at least one piece.
    pub fn measures(&self) -> Vec<Vec<TranscribedEvent>> {
        let capacity = self.time_signature.measure_capacity();
        let mut measures = Vec::new();
        let mut current = Vec::new();
        let mut filled = 0.0;

        for event in &self.events {
            let mut remaining = event.figure();
            let mut emitted = false;
            loop {
                let room = capacity - filled;
                if remaining > room && !figure_is_close(remaining, room) {
                    if room > MIN_PIECE {
                        current.push(event.with_figure(room));
                        emitted = true;
                    }
                    measures.push(std::mem::take(&mut current));
                    filled = 0.0;
                    remaining -= room;
                    continue;
                }
                if remaining > MIN_PIECE || (!event.is_rest() && !emitted) {
                    current.push(event.with_figure(remaining));
                    filled += remaining;
                }
                if figure_is_close(filled, capacity) {
                    measures.push(std::mem::take(&mut current));
                    filled = 0.0;
                }
                break;
            }
        }
        if !current.is_empty() {
            measures.push(current);
        }
        measures
    }
}
