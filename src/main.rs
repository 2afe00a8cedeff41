mod app;
mod cli;
mod config;
mod logging;
mod overlay;
mod relay;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use winit::event_loop::{DeviceEvents, EventLoop};

use crate::app::{App, Graphics};
use crate::cli::Args;
use crate::config::Config;
use crate::logging::init_logging;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    let (mut config, source) = Config::resolve(args.config.as_deref())?;
    if let Some(path) = &source {
        log::info!("loaded scene config from {}", path.display());
    }
    config.apply_args(&args);
    let options = config
        .to_runtime_options()
        .context("invalid runtime options")?;

    let event_loop = EventLoop::<Graphics>::with_user_event()
        .build()
        .context("failed to create winit EventLoop")?;
    event_loop.listen_device_events(DeviceEvents::Always);

    let mut app = App::new(&event_loop, config, options);
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;
    Ok(())
}
