// SPDX-License-Identifier: MIT OR Apache-2.0
//! clipkit player
//!
//! Loads a RON clip document, drives the stage at a fixed host tick rate and
//! prints what the display tree looks like after every tick.

use clap::Parser;
use clipkit_movieclip::{ClipDocument, ClipError};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Play a clip document headlessly
#[derive(Parser, Debug)]
#[command(name = "clipkit-player", version)]
struct Args {
    /// Clip document (RON)
    document: PathBuf,

    /// Number of host ticks to run
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Host ticks per second
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f64,

    /// Seek the root clip to this label before the first tick
    #[arg(long)]
    goto: Option<String>,

    /// Print one JSON snapshot per line instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Player failure
#[derive(Debug, thiserror::Error)]
enum PlayerError {
    /// Document could not be read
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be loaded or played
    #[error(transparent)]
    Clip(#[from] ClipError),

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["clipkit_player=info", "clipkit_movieclip=info"] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), PlayerError> {
    let text = std::fs::read_to_string(&args.document)?;
    let document = ClipDocument::from_ron(&text)?;
    let (mut stage, root) = document.build()?;
    tracing::info!(
        "Playing {} for {} ticks at {} Hz",
        args.document.display(),
        args.ticks,
        args.tick_rate
    );

    if let Some(label) = &args.goto {
        let found = stage.with_clip(root, |clip, stage| clip.goto_and_play(stage, label.as_str()))?;
        if !found {
            tracing::warn!("Label {label:?} not found, starting from the first frame");
        }
    }

    let elapsed_ms = (args.tick_rate.is_finite() && args.tick_rate > 0.0).then(|| 1000.0 / args.tick_rate);
    for _ in 0..args.ticks {
        stage.tick(elapsed_ms);
        for event in stage.take_events() {
            let source = stage.node(event.source).map_or("?", |n| n.name.as_str());
            tracing::info!(tick = event.tick, "{source}: {}", event.name);
        }

        let snapshot = stage.snapshot();
        if args.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            print!("{snapshot}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["clipkit-player", "scene.ron"]).unwrap();
        assert_eq!(args.ticks, 60);
        assert_eq!(args.tick_rate, 60.0);
        assert!(args.goto.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "clipkit-player",
            "scene.ron",
            "--ticks",
            "5",
            "--tick-rate",
            "24",
            "--goto",
            "intro",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.ticks, 5);
        assert_eq!(args.tick_rate, 24.0);
        assert_eq!(args.goto.as_deref(), Some("intro"));
        assert!(args.json);
    }

    #[test]
    fn test_missing_document_is_io_error() {
        let args = Args::try_parse_from(["clipkit-player", "/nonexistent/scene.ron"]).unwrap();
        assert!(matches!(run(&args), Err(PlayerError::Io(_))));
    }

    #[test]
    fn test_runs_demo_document() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/bounce.ron");
        let args = Args::try_parse_from(["clipkit-player", path, "--ticks", "3", "--goto", "fall"]).unwrap();
        assert!(run(&args).is_ok());
    }
}
