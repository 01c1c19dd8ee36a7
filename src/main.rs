use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::Parser;

use indicatif::ProgressStyle;
use tracing::{info, info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use particle_track::config::*;
use particle_track::image::HsvImage;
use particle_track::my_types::*;
use particle_track::synthetic::SyntheticSequence;
use particle_track::tracker::{ParticleTracker, TickReport};
use particle_track::video::VideoInput;

#[derive(Parser)]
pub struct Args {
    /// Video file, decoded with ffmpeg
    #[clap(short, long)]
    pub input: Option<String>,
    #[clap(long, default_value = "640")]
    pub width: usize,
    #[clap(long, default_value = "480")]
    pub height: usize,
    /// Track a generated moving disk for this many frames instead of a video
    #[clap(long)]
    pub synthetic: Option<usize>,
    /// JSON file replacing the tracker flags below
    #[clap(long)]
    pub config_file: Option<String>,
    /// Write one JSON report per frame
    #[clap(short, long)]
    pub output: Option<String>,
    #[clap(short, long)]
    pub verbose: bool,
    #[clap(flatten)]
    pub config: Config,
}

fn main() -> Result<()> {
    // parse the config
    let args = Args::parse();
    // from_json_file validates on its own
    let config = match &args.config_file {
        Some(path) => Config::from_json_file(Path::new(path))?,
        None => {
            args.config.validate()?;
            args.config.clone()
        }
    };
    let _ = CONFIG.set(config);

    // setup logging
    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(level)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stdout_writer()))
        .with(indicatif_layer)
        .init();

    let config = CONFIG.get().ok_or(anyhow!("config was not set"))?;
    let mut tracker = ParticleTracker::from_config(config)?;

    let mut output = match &args.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {path}"))?,
        )),
        None => None,
    };

    let header_span = info_span!("header");
    header_span.pb_set_style(&ProgressStyle::default_bar());
    let header_span_enter = header_span.enter();

    if let Some(frame_count) = args.synthetic {
        header_span.pb_set_length(frame_count as u64);
        let shape = (args.width, args.height);
        let mut sequence = SyntheticSequence::new(
            shape,
            (args.width + args.height) as f64 / 40.,
            Vector2d::new(args.width as f64 / 4., args.height as f64 / 3.),
            Vector2d::new(3., 2.),
            frame_count,
        );
        sequence.target_color = (
            config.target_hue.round().clamp(0., 179.) as u8,
            config.target_saturation.round().clamp(0., 255.) as u8,
        );
        let mut error_sum = 0.;
        let mut frames = 0;
        for frame in sequence {
            let report = tracker.process(&frame.image)?;
            error_sum += (report.centroid - frame.center).norm();
            frames += 1;
            handle_report(&report, &mut output, &header_span)?;
        }
        if frames > 0 {
            info!("mean centroid error {:.2} px over {} frames", error_sum / frames as f64, frames);
        }
    } else {
        let input = args
            .input
            .as_ref()
            .ok_or(anyhow!("either --input or --synthetic is required"))?;
        let mut video = VideoInput::new(Path::new(input), args.width, args.height)?;
        while let Some(rgb) = video.read()? {
            let hsv = HsvImage::from_rgb(rgb)?;
            let report = tracker.process(&hsv)?;
            handle_report(&report, &mut output, &header_span)?;
        }
    }

    tracker.shutdown();
    if let Some(output) = output.as_mut() {
        output.flush()?;
    }

    std::mem::drop(header_span_enter);
    std::mem::drop(header_span);

    Ok(())
}

fn handle_report(
    report: &TickReport,
    output: &mut Option<BufWriter<File>>,
    span: &Span,
) -> Result<()> {
    span.pb_inc(1);
    if report.target_lost {
        info!("frame {}: target lost", report.frame_number);
    }
    if let Some(output) = output {
        serde_json::to_writer(&mut *output, report)?;
        writeln!(output)?;
    }
    Ok(())
}
