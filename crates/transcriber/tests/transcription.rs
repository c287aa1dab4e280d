//! End-to-end transcription from synthetic snare audio and onset lists.

use approx::assert_relative_eq;
use snare_domain::{
    export_score, figure_is_close, ExportFormat, Tempo, TimeSignature, TranscribedEvent,
    FIGURE_RTOL,
};
use snare_transcriber::{
    generate_grid, segment, transcribe, TranscriptionError, TranscriptionJob,
    TranscriptionPipeline,
};

const SAMPLE_RATE: u32 = 44_100;

/// 10 ms decaying bursts at `times`, padded with silence to `total_seconds`.
fn snare_clicks(times: &[f64], total_seconds: f64) -> Vec<f32> {
    let rate = SAMPLE_RATE as f64;
    let mut samples = vec![0.0f32; (total_seconds * rate) as usize];
    let burst = (0.01 * rate) as usize;
    for &time in times {
        let start = (time * rate).round() as usize;
        for i in 0..burst {
            if let Some(sample) = samples.get_mut(start + i) {
                let decay = 1.0 - i as f64 / burst as f64;
                let tone = (2.0 * std::f64::consts::PI * 1_000.0 * i as f64 / rate).sin();
                *sample = (decay * tone.abs().max(0.2)) as f32;
            }
        }
    }
    samples
}

fn quarter_times(count: usize, bpm: f64) -> Vec<f64> {
    (0..count).map(|i| i as f64 * 60.0 / bpm).collect()
}

/// Hits never cross a barline; a rest may cover several whole measures.
fn assert_measures_saturated(events: &[TranscribedEvent], capacity: f64) {
    let mut running = 0.0;
    for event in events {
        assert!(
            event.figure() > capacity * FIGURE_RTOL,
            "degenerate figure in {events:?}"
        );
        running += event.figure();
        if event.is_rest() && running > capacity && !figure_is_close(running, capacity) {
            running = running.rem_euclid(capacity);
            if running <= capacity * FIGURE_RTOL {
                running = 0.0;
            }
        }
        if figure_is_close(running, capacity) {
            running = 0.0;
        }
        assert!(running < capacity, "measure overfilled in {events:?}");
    }
    assert_eq!(running, 0.0, "trailing measure not filled in {events:?}");
}

#[test]
fn quarter_notes_with_known_tempo() {
    let samples = snare_clicks(&quarter_times(8, 120.0), 4.5);
    let mut job = TranscriptionJob::new("clicks.wav", "Quarters");
    job.tempo = Some(120.0);

    let score = TranscriptionPipeline::default()
        .transcribe_samples(&samples, SAMPLE_RATE, &job)
        .unwrap();

    assert_eq!(score.tempo.bpm(), 120.0);
    assert_eq!(score.hit_count(), 8);
    assert!(score.events.iter().all(|event| *event == TranscribedEvent::hit(1.0)));
    assert_eq!(score.measures().len(), 2);
}

#[test]
fn quarter_notes_with_estimated_tempo() {
    let samples = snare_clicks(&quarter_times(16, 120.0), 8.5);
    let job = TranscriptionJob::new("clicks.wav", "Estimated");

    let score = TranscriptionPipeline::default()
        .transcribe_samples(&samples, SAMPLE_RATE, &job)
        .unwrap();

    let bpm = score.tempo.bpm();
    assert!((117.0..=123.0).contains(&bpm), "estimated {bpm} bpm");
    assert_eq!(bpm, bpm.round());
    assert_eq!(score.hit_count(), 16);
    assert!(score.events.iter().all(|event| *event == TranscribedEvent::hit(1.0)));
}

#[test]
fn decodes_and_transcribes_a_wav_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snare.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in snare_clicks(&quarter_times(8, 120.0), 4.5) {
        writer.write_sample((sample * 0.8 * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let mut job = TranscriptionJob::new(path.to_string_lossy(), "From disk");
    job.tempo = Some(120.0);
    let score = TranscriptionPipeline::default().transcribe(&job).unwrap();
    assert_eq!(score.hit_count(), 8);
    assert_measures_saturated(&score.events, 4.0);
}

#[test]
fn one_measure_of_quarters_at_sixty() {
    let onsets = [0.0, 1.0, 2.0, 3.0, 4.0];
    let grid = generate_grid(60.0, 12.0, 4).unwrap();
    let events = transcribe(&onsets, &grid, TimeSignature::default()).unwrap();

    let figures: Vec<f64> = events.iter().map(TranscribedEvent::figure).collect();
    assert_eq!(figures, vec![1.0, 1.0, 1.0, 1.0, 4.0]);
    assert!(events.iter().all(|event| !event.is_rest()));

    let measures = segment(&onsets, &grid, 4).unwrap();
    assert_eq!(measures, vec![vec![0.0, 1.0, 2.0, 3.0], vec![4.0]]);
}

#[test]
fn single_onset_is_rejected() {
    let grid = generate_grid(60.0, 8.0, 4).unwrap();
    assert!(matches!(
        transcribe(&[0.0], &grid, TimeSignature::default()),
        Err(TranscriptionError::InsufficientOnsets(1))
    ));
}

#[test]
fn mixed_rhythm_fills_every_measure() {
    let tempo = Tempo::new(100.0).unwrap();
    let beat = tempo.seconds_per_beat();
    let beats = [
        0.0,
        0.5,
        1.0,
        1.5,
        2.0,
        3.5,
        4.0,
        4.0 + 1.0 / 3.0,
        4.0 + 2.0 / 3.0,
        5.0,
        7.0,
        9.0,
    ];
    let onsets: Vec<f64> = beats.iter().map(|b| b * beat).collect();

    let score = TranscriptionPipeline::default()
        .transcribe_onsets(&onsets, tempo, TimeSignature::default(), "Mixed")
        .unwrap();

    assert_measures_saturated(&score.events, 4.0);
    assert_eq!(score.hit_count(), beats.len());
    assert_eq!(score.events.iter().filter(|event| event.is_rest()).count(), 1);
    for (event, expected) in score.events.iter().zip([0.5, 0.5, 0.5, 0.5, 1.5, 0.5]) {
        assert_relative_eq!(event.figure(), expected);
    }
}

#[test]
fn overflow_hit_and_rest_sum_to_the_gap() {
    let signature: TimeSignature = "3/4".parse().unwrap();
    let grid = generate_grid(90.0, 10.0, 4).unwrap();
    let beat = 60.0 / 90.0;
    let onsets = [0.0, 2.0 * beat, 4.0 * beat, 5.0 * beat];
    let events = transcribe(&onsets, &grid, signature).unwrap();

    assert_eq!(
        events,
        vec![
            TranscribedEvent::hit(2.0),
            TranscribedEvent::hit(1.0),
            TranscribedEvent::rest(1.0),
            TranscribedEvent::hit(1.0),
            TranscribedEvent::hit(1.0),
        ]
    );
    assert_measures_saturated(&events, 3.0);
}

#[test]
fn triplet_gaps_around_a_long_rest_end_on_a_full_bar() {
    let first = 4.0 / 3.0;
    let onsets = [0.0, first, first + 4.0, first + 4.0 + 2.0 / 3.0, 12.0];
    let score = TranscriptionPipeline::default()
        .transcribe_onsets(&onsets, Tempo::new(60.0).unwrap(), TimeSignature::default(), "Triplets")
        .unwrap();

    assert_measures_saturated(&score.events, 4.0);
    assert_eq!(score.hit_count(), onsets.len());
    assert_eq!(score.events.last(), Some(&TranscribedEvent::hit(4.0)));
    let bars = score.measures();
    assert_eq!(bars.last(), Some(&vec![TranscribedEvent::hit(4.0)]));
}

#[test]
fn exports_json_and_musicxml() {
    let score = TranscriptionPipeline::default()
        .transcribe_onsets(
            &[0.0, 0.25, 0.5, 1.0],
            Tempo::new(120.0).unwrap(),
            TimeSignature::default(),
            "Export",
        )
        .unwrap();

    let json = export_score(&score, ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["title"], "Export");
    assert_eq!(value["time_signature"], "4/4");
    assert_eq!(value["events"][0]["kind"], "hit");

    let xml = String::from_utf8(export_score(&score, ExportFormat::MusicXml).unwrap()).unwrap();
    assert!(xml.contains("<score-partwise"));
    assert!(xml.contains("<movement-title>Export</movement-title>"));
    assert!(xml.contains("<unpitched>"));
}
