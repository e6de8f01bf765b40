use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use spurtwall_lib::{
    projection::render::render_layout,
    replay::{Replay, ReplayScript},
    init_logging, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "spurtwall", about = "Replay a typing log and show its spurts")]
struct CliArgs {
    /// JSON script of timestamped input events and stream commands
    script: PathBuf,

    /// Settings file with default thresholds and log level
    #[arg(long, default_value = "spurtwall.json")]
    settings: PathBuf,

    /// Print the final registry snapshot as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let settings = Settings::load(&args.settings)?.with_env_overrides();
    init_logging(settings.log_filter());

    let mut script = ReplayScript::from_file(&args.script)?;
    if script.config.is_none() {
        script.config = Some(settings.segmentation());
    }

    let replay = Replay::run(&script)?;
    let snapshot = replay.snapshot();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", render_layout(&snapshot));
    }

    log::info!("{} spurts across {} streams", replay.finished().len(), snapshot.streams.len());
    Ok(())
}
