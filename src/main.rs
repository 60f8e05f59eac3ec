use clap::Parser;
use log::{error, warn};
use std::sync::Arc;
use w1_sensord::core::{RetryPolicy, Scheduler, SensorCache};
use w1_sensord::{server, Config};

/// w1-sensord - staleness-aware caching daemon for DS18B20 1-Wire sensors
#[derive(Parser, Debug)]
#[command(name = "w1-sensord")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Query interface port (overrides SERVER_PORT)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // .env values feed the same lookup path as real environment variables.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logger with verbosity based on -d/--debug flag
    // Level 0 (default): warn only (quiet)
    // Level 1: info (normal verbosity)
    // Level 2: debug (detailed)
    // Level 3+: trace (very detailed)
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting w1-sensord v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    let cache = Arc::new(SensorCache::new(config.configured()));

    // The query interface only ever reads the cache; it gets its own thread
    // so a slow client cannot interfere with the poll heartbeat.
    let query_cache = cache.clone();
    let port = config.port;
    std::thread::spawn(move || {
        if let Err(e) = server::serve(query_cache, port) {
            error!("{e}");
            std::process::exit(1);
        }
    });

    Scheduler::new(cache, config.bus_files(), RetryPolicy::default())
        .run()
        .await;
}
