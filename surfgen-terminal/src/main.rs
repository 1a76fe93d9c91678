/// surfgen terminal viewer
///
/// Renders one of the demo scenes as coloured ASCII.
/// Controls:
///   - Mouse drag: Rotate
///   - WASD / Arrow Keys: Spin
///   - Q/ESC: Quit
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use surfgen_core::{DemoScene, PiplupDetail};
use surfgen_terminal::{AppConfig, TerminalApp};
use tracing::info;

#[derive(Parser)]
#[command(name = "surfgen")]
#[command(about = "Procedural surfaces and the Piplup model, rendered in the terminal")]
#[command(version)]
struct Cli {
    /// Scene to show: piplup, piplup-classic, surfaces, tube, cube or curves
    #[arg(default_value = "piplup")]
    scene: DemoScene,

    /// JSON file overriding the viewer defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build the Piplup at its full sphere resolution
    #[arg(long)]
    full_detail: bool,
}

fn main() -> Result<()> {
    // Set RUST_LOG to control the log level, e.g. RUST_LOG=surfgen_core=debug.
    // Logs go to stderr; redirect it to keep them off the frame.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let detail = if cli.full_detail {
        PiplupDetail::Full
    } else {
        PiplupDetail::Preview
    };

    let scene = cli
        .scene
        .build(detail)
        .with_context(|| format!("building scene {}", cli.scene))?;
    info!(scene = %cli.scene, parts = scene.len(), ?detail, "scene ready");

    let view = config.view(cli.scene.view_distance());
    let mut app = TerminalApp::new(scene, cli.scene.name(), view, &config)?;
    app.run()?;

    Ok(())
}
