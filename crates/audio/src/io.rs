use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::dsp::{mix_to_mono, resample_linear};

/// Decoded track, already mixed down to a single channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioReader {
    pub sample_rate: u32,
    /// Channel count of the source before mixdown.
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioReader {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn resampled(self, sample_rate: u32) -> Self {
        if sample_rate == self.sample_rate {
            return self;
        }
        debug!(from = self.sample_rate, to = sample_rate, "resampling audio");
        Self {
            samples: resample_linear(&self.samples, self.sample_rate, sample_rate),
            sample_rate,
            channels: self.channels,
        }
    }
}

pub struct AudioDecoder;

impl AudioDecoder {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AudioReader> {
        let path_ref = path.as_ref();
        let file =
            File::open(path_ref).with_context(|| format!("open audio file {:?}", path_ref))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("probe audio format of {:?}", path_ref))?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);

        let mut interleaved = Vec::new();
        let mut buffer: Option<SampleBuffer<f32>> = None;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }
            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    channels = spec.channels.count() as u16;
                    let out = buffer.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                    });
                    out.copy_interleaved_ref(decoded);
                    interleaved.extend_from_slice(out.samples());
                }
                Err(SymphError::DecodeError(reason)) => {
                    warn!(reason, "skipping undecodable packet");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let samples = mix_to_mono(&interleaved, channels as usize);
        debug!(
            path = ?path_ref,
            sample_rate,
            channels,
            frames = samples.len(),
            "decoded audio"
        );
        Ok(AudioReader {
            sample_rate,
            channels,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_reader_handles_missing_file() {
        let result = AudioDecoder::open("does-not-exist.wav");
        assert!(result.is_err());
    }

    #[test]
    fn reader_reports_duration_and_resamples() {
        let reader = AudioReader {
            sample_rate: 8,
            channels: 2,
            samples: vec![0.0; 16],
        };
        assert_eq!(reader.duration_seconds(), 2.0);
        let resampled = reader.resampled(4);
        assert_eq!(resampled.sample_rate, 4);
        assert_eq!(resampled.samples.len(), 8);
        assert_eq!(resampled.duration_seconds(), 2.0);
    }
}
