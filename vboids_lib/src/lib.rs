use birdwatcher::{Birdwatcher, BoidData};
use error::Result;
use flock::Flock;
use options::RunOptions;

pub mod boid;
pub mod error;
pub mod flock;

pub mod birdwatcher;
pub mod math_helpers;
pub mod options;

/// Headless run of a two dimensional flock, sampled and optionally saved.
pub fn flock_base(no_iter: u64, dt: f32, run_options: RunOptions) -> Result<Vec<BoidData>> {
    let save_options = run_options.save_options.clone();
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);
    let mut flock = Flock::new(run_options)?;

    (0..no_iter).for_each(|_| {
        flock.step(dt);
        bird_watcher.watch(&flock);
    });

    bird_watcher.pop_data_save(&save_options)
}
