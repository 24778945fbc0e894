mod audio;
mod cli;
mod config;
mod dsp;
mod error;
mod indicator;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use audio::source::{SampleTable, Segment};
use cli::{Cli, TransformKind};
use dsp::classify::BandThresholds;
use dsp::transform::{ForwardTransform, Radix2Transform, RustFftTransform};
use indicator::ConsoleIndicator;
use pipeline::pacing::FixedInterval;
use pipeline::scheduler::{FrameScheduler, RunSummary};

/// The table flashed onto the board when no file is given: one second of 1 kHz.
const DEFAULT_TONE_HZ: f32 = 1000.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    let mut thresholds = BandThresholds::default();
    if let Some(path) = config::find_config_path(cli.config.clone()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                // Config values apply only when the CLI is at its default
                if cli.frame_size == config::default_frame_size() {
                    cli.frame_size = cfg.analysis.frame_size;
                }
                if cli.interval_ms == config::default_interval_ms() {
                    cli.interval_ms = cfg.pacing.interval_ms;
                }
                if cli.segment_start == config::default_segment_start() {
                    cli.segment_start = cfg.source.segment_start;
                }
                if cli.segment_duration == config::default_segment_duration() {
                    cli.segment_duration = cfg.source.segment_duration;
                }
                thresholds = cfg.bands;
            }
            Err(err) => log::warn!("{:#}", err),
        }
    }

    log::info!("bandlight - dominant frequency band indicator");
    log::info!(
        "Frame: {} samples, pacing {}ms, bands: low < {} Hz <= mid < {} Hz <= high",
        cli.frame_size,
        cli.interval_ms,
        thresholds.low_mid_hz,
        thresholds.mid_high_hz
    );

    let source = build_source(&cli)?;

    if let Some(ref path) = cli.export {
        return source.export_c_array(path, &cli.export_name);
    }

    let transform: Box<dyn ForwardTransform> = match cli.transform {
        TransformKind::Rustfft => Box::new(RustFftTransform::new(cli.frame_size)?),
        TransformKind::Reference => Box::new(Radix2Transform::new(cli.frame_size)?),
    };
    log::info!("Transform: {:?}", cli.transform);

    let pacer = FixedInterval::from_millis(cli.interval_ms);

    let Some(cycles) = cli.cycles else {
        let scheduler = FrameScheduler::new(
            source,
            cli.frame_size,
            transform,
            thresholds,
            ConsoleIndicator::new(None),
            pacer,
        )
        .context("Invalid configuration")?;
        scheduler.run_forever();
    };

    let pb = ProgressBar::new(cycles as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} cycles  {msg}")?
            .progress_chars("=>-"),
    );

    let mut scheduler = FrameScheduler::new(
        source,
        cli.frame_size,
        transform,
        thresholds,
        ConsoleIndicator::new(Some(pb.clone())),
        pacer,
    )
    .context("Invalid configuration")?;

    let bands = scheduler.run_cycles(cycles);
    pb.finish();

    let summary = RunSummary::from_bands(&bands, scheduler.cursor());
    log::info!(
        "Ran {} cycles: low={} mid={} high={}, {} band changes, cursor at {}",
        summary.cycles,
        summary.low,
        summary.mid,
        summary.high,
        summary.band_changes,
        summary.final_cursor
    );
    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn build_source(cli: &Cli) -> Result<SampleTable> {
    if let Some(ref input) = cli.input {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
        log::info!("Input: {}", input.display());
        let audio = audio::decode::decode_file(input)?;
        log::info!("Audio length {:.1}s", audio.duration_secs());
        let segment = Segment {
            start_secs: cli.segment_start,
            duration_secs: cli.segment_duration,
        };
        return SampleTable::from_audio(&audio, segment).context("Unusable audio segment");
    }

    let table = if cli.silence {
        log::info!("Source: silence, {} samples @ {}Hz", cli.source_len, cli.sample_rate);
        SampleTable::silence(cli.sample_rate, cli.source_len)
    } else {
        let freq = cli.tone.unwrap_or(DEFAULT_TONE_HZ);
        log::info!("Source: {:.1} Hz tone, {} samples @ {}Hz", freq, cli.source_len, cli.sample_rate);
        SampleTable::tone(freq, cli.sample_rate, cli.source_len)
    };
    table.context("Invalid synthetic source")
}
