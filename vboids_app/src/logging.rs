use env_logger::{Builder, Env};
use log::LevelFilter;

/// Sets up `env_logger` for the `vboids` run.
///
/// Without `--verbose` only the initialisation and save summaries are
/// printed, with it every tick logs at debug level. A `RUST_LOG` in the
/// environment overrides both, e.g. `RUST_LOG=vboids_lib=warn`.
pub fn init(verbose: bool) {
    let default_level = match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };

    let env = Env::default().default_filter_or(default_level.as_str());
    if Builder::from_env(env).format_timestamp_millis().try_init().is_err() {
        log::debug!("logger already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_twice_is_harmless() {
        // the second call finds the first logger installed and must not panic
        init(true);
        init(false);
    }
}
