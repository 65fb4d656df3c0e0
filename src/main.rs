use anyhow::Result;
use search_load::{report, telemetry};
use search_load::{
    ConfigResolver, CorpusLoader, LoadDriver, Properties, ReportFormat, ReqwestClient, RunConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    telemetry::init_tracing();

    let props_path = std::env::var("SEARCH_LOAD_PROPERTIES")
        .unwrap_or_else(|_| "search-load.toml".to_string());
    let properties = Properties::load(&props_path)?;
    let cfg = RunConfig::resolve(&ConfigResolver::new(properties))?;
    debug!(?cfg, "configuration resolved");

    let corpus = CorpusLoader::load(&cfg.corpus_path).await?;
    // stdout carries only the report document in json mode.
    let announce = cfg.report_format == ReportFormat::Human;
    if corpus.is_empty() {
        if announce {
            println!(
                "No search terms found in {}; exiting simulation setup.",
                cfg.corpus_path.display()
            );
        }
    } else {
        info!(terms = corpus.len(), path = %cfg.corpus_path.display(), "corpus loaded");
        if announce {
            println!("Found {} terms.", corpus.len());
        }
    }

    let client = ReqwestClient::new(&cfg.scenario_name, cfg.request_timeout)?;
    let cancel = CancellationToken::new();
    telemetry::cancel_on_shutdown(cancel.clone());

    info!(
        endpoint = %cfg.endpoint,
        concurrency = cfg.concurrency,
        overlay = %cfg.overlay_raw,
        "starting {}", cfg.scenario_name
    );
    let result = LoadDriver::new(Arc::new(client))
        .run(&cfg, corpus, cancel.clone())
        .await;
    cancel.cancel();

    report::print_report(&result, &cfg.scenario_name, cfg.report_format)?;
    Ok(())
}
