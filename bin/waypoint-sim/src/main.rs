use std::{fs, path::Path, str::FromStr};

use alloy_primitives::B256;
use anyhow::Context;
use waypoint_common::logging;
use waypoint_config::Config;
use waypoint_sim::{network::Network, scenario};

use crate::args::Args;

mod args;

const DEFAULT_MESSAGE: B256 = B256::new([0xaa; 32]);

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");
        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    let config = load_configuration(&args.config)?;
    config.validate()?;

    // Init the logging before we do anything else.
    init_logging(&config);

    let message = match &args.message {
        Some(m) => B256::from_str(m).context("parsing message")?,
        None => DEFAULT_MESSAGE,
    };

    let mut network = Network::build(&config)?;
    network.warm_up(args.warmup_blocks)?;

    let report = scenario::run(&mut network, message)?;
    for line in &report {
        println!("{line}");
    }

    logging::finalize();
    Ok(())
}

fn load_configuration(path: &Path) -> anyhow::Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let conf = toml::from_str::<Config>(&config_str).context("parsing config")?;
    Ok(conf)
}

fn init_logging(config: &Config) {
    let lconfig = logging::LoggerConfig::with_fallback_label(
        "waypoint-sim",
        config.logging.service_label.as_deref(),
    );
    logging::init(lconfig);
}
