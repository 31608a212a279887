use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::{error::Result, flock::Flock, options::SaveOptions};

/// One sampled agent, a row of the exported CSV
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoidData {
    pub id: usize,
    /// sample index, not ticks
    pub time: u64,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub n_neighbours: usize,
}

/// Accumulates flock samples every `sample_rate` ticks.
pub struct Birdwatcher {
    locations: Vec<BoidData>,
    render_ticker: u64,
    sample_rate: u64,
}

const PREFIX: &str = "boids-data";

impl Birdwatcher {
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            locations: Vec::new(),
            render_ticker: 0,
            // every tick rather than dividing by zero
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection
    pub fn watch(&mut self, flock: &Flock) {
        if !self.should_sample() {
            return;
        }

        let time = self.render_ticker / self.sample_rate;
        let current_locations = flock
            .view()
            .zip(flock.metadata().iter())
            .map(|(boid, metadata)| BoidData {
                id: boid.id,
                time,
                x: boid.x(),
                y: boid.y(),
                heading: boid.heading(),
                n_neighbours: metadata.n_neighbours,
            });

        self.locations.extend(current_locations);
    }

    pub fn restart(&mut self) {
        self.locations.clear();
        self.render_ticker = 0;
    }

    pub fn pop_data(&mut self) -> Vec<BoidData> {
        mem::take(&mut self.locations)
    }

    /// Saves the latest data in CSV format, then returns it while emptying the birdwatcher's memory
    ///
    /// Depending on save options, either overwrites the current file or writes a new timestamped file
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> Result<Vec<BoidData>> {
        let data = self.pop_data();

        if !save_options.save_locations {
            return Ok(data);
        }

        if let Some(path) = &save_options.save_locations_path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = Birdwatcher::get_dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&file_path)?;
            let mut wtr = csv::Writer::from_writer(file);

            for b in data.iter() {
                wtr.serialize(b)?;
            }
            wtr.flush()?;

            info!("saved {} samples to {file_path}", data.len());
        }

        Ok(data)
    }

    fn get_dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_locations_timestamp {
            true => {
                let datetime_part = now.timestamp_millis();
                format!(
                    "{prefix}_{datetime}.csv",
                    prefix = PREFIX,
                    datetime = datetime_part
                )
            }
            false => format!("{prefix}.csv", prefix = PREFIX),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}
