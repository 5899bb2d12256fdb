use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use price_arbiter::config::{build_sources, AppConfig};
use price_arbiter::observability::metrics::register_metrics;
use price_arbiter::observability::tracing::init_tracing;
use price_arbiter::persistence::StateFile;
use price_arbiter::MultiSourcePriceService;

#[derive(Parser, Debug)]
#[command(name = "price-arbiter", about = "Check an item against every configured price source")]
struct Args {
    /// Config file; overrides the layered config/ directory lookup
    #[arg(long, env = "PRICE_ARBITER_CONFIG")]
    config: Option<PathBuf>,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(long, default_value = "local")]
    env: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Disable a source by name (repeatable); persisted when a state file is configured
    #[arg(long = "disable")]
    disable: Vec<String>,

    /// Force arbitration on regardless of config
    #[arg(long)]
    arbitrate: bool,

    /// Raw item text, e.g. pasted from the clipboard
    item: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);
    if let Err(e) = register_metrics() {
        tracing::warn!("Metrics registration failed: {}", e);
    }

    let app = match &args.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(&args.env),
    }
    .context("loading configuration")?;

    let sources = build_sources(&app.sources).context("building price sources")?;
    let mut service = MultiSourcePriceService::new(sources)?
        .with_arbitration(app.aggregator.arbitration || args.arbitrate)
        .with_log_context(app.aggregator.log_context_map());
    if let Some(max_workers) = app.aggregator.max_workers {
        service = service.with_max_workers(max_workers);
    }

    if let Some(path) = &app.aggregator.state_file {
        let store = StateFile::new(path);
        match store.load() {
            Ok(state) => service = service.with_enabled_state(&state),
            Err(e) => tracing::warn!("Ignoring unreadable state file {}: {}", path.display(), e),
        }
        service = service.on_enabled_change(store.callback());
    }

    if !args.disable.is_empty() {
        let mut state = service.get_enabled_state();
        for name in &args.disable {
            state.insert(name.clone(), false);
        }
        service.set_enabled_state(&state);
    }

    let text = args.item.join(" ");
    let rows = service.check_item(&text).await;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
