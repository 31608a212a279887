// https://docs.rs/clap-serde/latest/clap_serde/#
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};
use vboids_lib::options::{self, InitiationStrategy, RunOptions, SaveOptions};

#[derive(Parser, ClapSerde)]
#[command(author = "PheelaV", version, about, long_about = None)]
/// Headless vectorised boids (Reynolds '87), sampled to CSV.
pub struct Args {
    /// Config file
    #[arg(short, long = "config", default_value = "config.toml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize, Debug)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(256)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(2)]
    #[arg(short = 'd', long)]
    pub dimension: usize,

    #[default(600)]
    #[arg(short = 'i', long)]
    /// ticks to simulate
    pub iterations: u64,

    #[default(0.016)]
    #[arg(long)]
    /// time step of a tick
    pub dt: f32,

    #[default(100.)]
    #[arg(long)]
    pub speed: f32,

    #[default(80.)]
    #[arg(long = "neigh_radius")]
    pub neighbourhood_radius: f32,

    #[default(20.)]
    #[arg(long = "sep_radius")]
    pub separation_radius: f32,

    #[default(0.5)]
    #[arg(long = "coh_factor")]
    /// cohesion weight in [0, 1], alignment gets the rest
    pub cohesion_factor: f32,

    #[default(true)]
    #[arg(long)]
    /// restrict cohesion and alignment to the forward half-space
    pub vision: bool,

    #[default(false)]
    #[arg(long)]
    /// start on a circle heading inwards instead of at random
    pub circle: bool,

    #[default(1200.)]
    #[arg(short = 'x', long)]
    pub init_width: f32,

    #[default(800.)]
    #[arg(short = 'y', long)]
    pub init_height: f32,

    #[default(800.)]
    #[arg(short = 'z', long)]
    /// bound of every dimension past the first two
    pub extent: f32,

    #[default(0)]
    #[arg(long)]
    /// fixes the initial placement, 0 draws a fresh seed every run
    pub seed: u64,

    #[default(4)]
    #[arg(short = 'r', long)]
    /// ratio of ticks/sample_rate, e,g, 4 = sample every 4th tick
    pub sample_rate: u64,

    #[default(true)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default("./".to_owned())]
    #[arg(short = 'o', long)]
    /// directory prefix of the saved CSV, including the trailing separator
    pub output: String,

    #[default(false)]
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Config {
    /// Library options for this configuration, validated against its dimension
    pub fn run_options(&self) -> vboids_lib::error::Result<RunOptions> {
        let mut run_options: RunOptions = Default::default();

        run_options.init_boids = self.no_boids;
        run_options.seed = (self.seed != 0).then_some(self.seed);
        run_options.initiation_strat = if self.circle {
            InitiationStrategy::CircleCircumferenceIn
        } else {
            InitiationStrategy::RandomRandom
        };

        run_options.speed = self.speed;
        run_options.neighbourhood_radius = self.neighbourhood_radius;
        run_options.separation_radius = self.separation_radius;
        run_options.set_cohesion_factor(self.cohesion_factor)?;
        run_options.use_vision = self.vision;

        let mut bounds = options::get_wrap_bounds(self.init_width, self.init_height);
        bounds.extent = self.extent;
        run_options.bounds = bounds;

        run_options.sample_rate = self.sample_rate;
        run_options.save_options = SaveOptions {
            save_locations: self.save,
            save_locations_path: Some(self.output.clone()),
            save_locations_timestamp: self.save_timestamp,
        };

        run_options.validate(self.dimension)?;

        Ok(run_options)
    }
}
