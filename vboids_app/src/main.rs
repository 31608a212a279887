use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use clap_serde_derive::{clap::Parser, ClapSerde};
use log::info;
use vboids_lib::{birdwatcher::Birdwatcher, flock::Flock};

mod cliargs;
mod logging;

use cliargs::{Args, Config};

fn main() -> Result<()> {
    // Parse whole args with clap
    let mut args = Args::parse();

    let config = match File::open(&args.config_path) {
        // merge config already parsed from clap
        Ok(f) => Config::from(read_config(f, &args.config_path)?).merge(&mut args.config),
        // If there is not config file return only config parsed from clap
        Err(_) => Config::from(&mut args.config),
    };

    logging::init(config.verbose);

    let run_options = config
        .run_options()
        .context("invalid flock configuration")?;
    let save_options = run_options.save_options.clone();

    let mut flock = Flock::initialize(config.no_boids, config.dimension, run_options)?;
    let mut bird_watcher = Birdwatcher::new(config.sample_rate);

    for _ in 0..config.iterations {
        flock.step(config.dt);
        bird_watcher.watch(&flock);
    }

    let data = bird_watcher
        .pop_data_save(&save_options)
        .context("could not save trajectory")?;

    let mean_neighbours = if flock.is_empty() {
        0.
    } else {
        let total: usize = flock.metadata().iter().map(|m| m.n_neighbours).sum();
        total as f32 / flock.len() as f32
    };
    info!(
        "simulated {} boids for {} ticks, {} samples, {mean_neighbours:.2} neighbours on average",
        flock.len(),
        config.iterations,
        data.len(),
    );

    Ok(())
}

/// Config file defaults, TOML by extension, YAML otherwise
fn read_config(mut f: File, path: &Path) -> Result<<Config as ClapSerde>::Opt> {
    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .with_context(|| format!("could not read {}", path.display()))?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("error in configuration file {}", path.display()))?,
        _ => serde_yaml::from_str(&contents)
            .with_context(|| format!("error in configuration file {}", path.display()))?,
    };

    Ok(config)
}
