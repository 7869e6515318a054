use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use housing_api::config::{AppState, Config};
use housing_api::dataset::Dataset;
use housing_api::{logger, server, Error};

/// Serve housing features as GeoJSON, filtered by municipality
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, env = "HOUSING_CONFIG", default_value = "config")]
    config: String,

    /// Override `dataset.path` from the configuration
    #[arg(short, long)]
    dataset: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> housing_api::Result<()> {
    let mut cfg = Config::load_from(&args.config)?;
    if let Some(path) = args.dataset {
        cfg.dataset.path = path;
    }

    logger::init(&cfg).map_err(Error::Logging)?;

    // The dataset must be complete before anything is served
    let dataset = Dataset::load(&cfg.dataset)?;
    logger::log_dataset_loaded(&cfg.dataset.path, &dataset);

    let addr = cfg.get_socket_addr()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(Error::Runtime)?;

    runtime.block_on(async_main(cfg, dataset, addr))
}

async fn async_main(cfg: Config, dataset: Dataset, addr: SocketAddr) -> housing_api::Result<()> {
    let listener = server::create_listener(addr, cfg.performance.backlog)
        .map_err(|source| Error::Bind { addr, source })?;
    let bound = listener.local_addr().unwrap_or(addr);

    logger::log_server_start(&bound, &cfg);

    let state = Arc::new(AppState::new(cfg, dataset));
    server::run(listener, state).await;
    Ok(())
}
