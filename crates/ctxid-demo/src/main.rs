//! ctxid-demo: HTTP server showing correlation-ID propagation through both
//! the context and the locals middleware.

mod config;
mod server;
mod stats;

use config::DemoConfig;
use server::AppState;
use stats::JobStats;

fn main() -> anyhow::Result<()> {
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("CTXID_CONFIG").ok())
            .unwrap_or_else(|| "ctxid-demo.toml".to_string())
    };

    let config = DemoConfig::load(&config_path)?;

    // The tonic OTLP exporter needs a reactor, so build the runtime first
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let _tracing_guard = ctxid_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            generator = ?config.correlation.generator,
            skip_paths = ?config.correlation.skip_paths,
            "Starting ctxid-demo"
        );

        run(config).await
    })
}

async fn run(config: DemoConfig) -> anyhow::Result<()> {
    let settings = config.correlation.middleware_config().resolve()?;

    let state = AppState {
        stats: JobStats::new(),
    };

    server::run(&config, settings, state).await
}
