pub mod error;
pub mod events;
pub mod io;
pub mod score;
pub mod tempo;
pub mod time_signature;

pub use crate::error::DomainError;
pub use crate::events::{
    figure_is_close, BaseValue, NoteValue, TranscribedEvent, FIGURE_RTOL, SNARE_MIDI_NOTE,
};
pub use crate::io::{
    export_score, ExportFormat, JsonExporter, MusicXmlExporter, NotationExporter,
};
pub use crate::score::Score;
pub use crate::tempo::Tempo;
pub use crate::time_signature::TimeSignature;
