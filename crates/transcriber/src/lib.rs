//! Snare onset quantization: metronome grid, figure matching, measure
//! segmentation and rhythm transcription, plus the audio-to-score pipeline.

pub mod config;
pub mod error;
pub mod figure;
pub mod measures;
pub mod metronome;
pub mod pipeline;
pub mod rhythm;
pub mod tempo;

pub use config::PipelineConfig;
pub use error::TranscriptionError;
pub use figure::{best_candidate, best_figure, candidates, FigureCandidate, FigureKind};
pub use measures::segment;
pub use metronome::{generate_grid, MetronomeGrid};
pub use pipeline::{TranscriptionJob, TranscriptionPipeline};
pub use rhythm::{transcribe, Placement};
pub use tempo::TempoEstimator;
