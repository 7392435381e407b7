// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hand_pointer::data::DataExporter;
use hand_pointer::handoff::ThreadedSource;
use hand_pointer::pointer::{EnigoPointer, RecordingPointer};
use hand_pointer::source::CsvFrameSource;
use hand_pointer::{ControllerConfig, FrameOutcome, GestureController, GestureProfile, PointerSink};

/// Hand Pointer - drive the mouse with hand gestures
#[derive(Parser, Debug)]
#[command(name = "hand_pointer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed landmark frames through the gesture pipeline
    Run {
        /// Landmark CSV file, or `-` to read an estimator's output from stdin
        input: String,

        /// Record pointer actions instead of injecting them
        #[arg(long)]
        dry_run: bool,

        /// Read frames on a separate thread, keeping only the newest one
        #[arg(long)]
        threaded: bool,

        /// Replay file frames at their recorded pace
        #[arg(long)]
        realtime: bool,

        /// Override the gesture profile from the config
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        /// Accept one gesture decision per suppression interval
        #[arg(long)]
        suppress: bool,

        /// Write per-frame decisions and a summary into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    PrintConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    Discrete,
    SplitScroll,
}

impl From<ProfileArg> for GestureProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Discrete => GestureProfile::Discrete,
            ProfileArg::SplitScroll => GestureProfile::SplitScroll,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ControllerConfig::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::PrintConfig => {
            println!("{}", config.to_json()?);
            Ok(())
        }
        Commands::Run {
            input,
            dry_run,
            threaded,
            realtime,
            profile,
            suppress,
            export,
        } => {
            if let Some(profile) = profile {
                config.gesture.profile = profile.into();
            }
            if suppress {
                config.gesture.suppression_enabled = true;
            }
            run(config, &input, dry_run, threaded, realtime, export)
        }
    }
}

fn run(
    config: ControllerConfig,
    input: &str,
    dry_run: bool,
    threaded: bool,
    realtime: bool,
    export: Option<PathBuf>,
) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));

    let csv_source = CsvFrameSource::from_input(input, realtime)?;

    let mut sink: Box<dyn PointerSink> = if dry_run {
        info!("Dry run: pointer actions are only recorded");
        let (w, h) = (
            config.screen.width.unwrap_or(1920),
            config.screen.height.unwrap_or(1080),
        );
        Box::new(RecordingPointer::new(w, h))
    } else {
        Box::new(EnigoPointer::new().context("Failed to access the system pointer")?)
    };

    let mut controller = GestureController::new(config)?;
    let mut exporter = export.map(|dir| DataExporter::new(dir, None));

    let mut on_frame = |outcome: &FrameOutcome| {
        if let Some(exporter) = exporter.as_mut() {
            exporter.add_frame(outcome);
        }
    };

    let stats = if threaded {
        let mut source = ThreadedSource::spawn(csv_source, Arc::clone(&stop));
        let result = controller.run(&mut source, sink.as_mut(), &stop, &mut on_frame);
        controller.record_dropped_frames(source.dropped_frames());
        result.map(|_| controller.stats().clone())?
    } else {
        let mut source = csv_source;
        controller.run(&mut source, sink.as_mut(), &stop, &mut on_frame)?
    };

    if let Some(exporter) = exporter {
        let csv_path = exporter.export_csv()?;
        let summary_path = exporter.export_summary(&stats)?;
        info!("Wrote {} and {}", csv_path.display(), summary_path.display());
    }

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
