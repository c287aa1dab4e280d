use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use snare_domain::{export_score, ExportFormat, Tempo, TimeSignature};
use snare_transcriber::{PipelineConfig, TranscriptionJob, TranscriptionPipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Transcribe snare drum audio into rhythmic notation", long_about = None)]
struct Cli {
    /// Audio file to transcribe
    #[arg(required_unless_present = "onsets")]
    input: Option<PathBuf>,
    /// JSON array of onset times in seconds, used instead of audio
    #[arg(long, conflicts_with = "input", requires = "tempo")]
    onsets: Option<PathBuf>,
    /// Title of the generated score
    #[arg(short, long, default_value = "Untitled Transcription")]
    title: String,
    /// Tempo in bpm; estimated from the audio when omitted
    #[arg(long)]
    tempo: Option<f64>,
    #[arg(short = 's', long, default_value = "4/4")]
    time_signature: String,
    /// Resample the audio before analysis
    #[arg(long)]
    sample_rate: Option<u32>,
    /// YAML pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Score format: json or musicxml
    #[arg(short, long, default_value = "json", value_parser = ExportFormat::from_str)]
    format: ExportFormat,
    /// Write the score here instead of stdout; the format's extension is
    /// added when the path has none
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn output_path(mut path: PathBuf, format: ExportFormat) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension(format.extension());
    }
    path
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = TranscriptionPipeline::new(config);

    let score = if let Some(path) = &cli.onsets {
        let raw = fs::read_to_string(path).with_context(|| format!("read onsets {:?}", path))?;
        let onsets: Vec<f64> =
            serde_json::from_str(&raw).with_context(|| format!("parse onsets {:?}", path))?;
        let tempo = Tempo::new(cli.tempo.context("--onsets requires --tempo")?)?;
        let signature: TimeSignature = cli.time_signature.parse()?;
        pipeline.transcribe_onsets(&onsets, tempo, signature, &cli.title)?
    } else {
        let input = cli.input.context("missing audio input")?;
        let job = TranscriptionJob {
            audio_path: input.to_string_lossy().into_owned(),
            title: cli.title,
            tempo: cli.tempo,
            time_signature: cli.time_signature,
            sample_rate: cli.sample_rate,
        };
        pipeline.transcribe(&job)?
    };

    let bytes = export_score(&score, cli.format)?;
    match cli.output {
        Some(path) => {
            let path = output_path(path, cli.format);
            fs::write(&path, &bytes).with_context(|| format!("write score {:?}", path))?;
            info!(path = ?path, events = score.events.len(), "score written");
        }
        None => println!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}
