use std::path::PathBuf;

use ratatui_runtime::Runtime;

use crate::{command::play::app::PlayApp, config::GameArgs, logging};

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    game: GameArgs,
    /// Write logs to this file (logging is off otherwise)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { game, log_file } = arg;

    if let Some(path) = log_file {
        logging::init_file(path)?;
    }
    let engine = game.resolve()?.build_engine()?;

    let mut app = PlayApp::new(engine);
    Runtime::new().run(&mut app)?;
    Ok(())
}
