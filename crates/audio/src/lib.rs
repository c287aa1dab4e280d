pub mod dsp;
pub mod error;
pub mod io;
pub mod onset;
pub mod tempo;

#[cfg(test)]
pub(crate) mod test_support;

pub use dsp::{mix_to_mono, normalize_buffer, resample_linear, PeakLevel};
pub use error::AudioError;
pub use io::{AudioDecoder, AudioReader};
pub use onset::{energy_flux, EnergyFluxOnsetDetector, OnsetConfig, OnsetDetector};
pub use tempo::{AutocorrelationTempoDetector, TempoConfig, TempoDetector};
