//! Entry point for the catalog search synchronizer.
//!
//! Operator actions, mirroring the admin surface of the catalog app:
//!
//! - `search-sync rebuild` — atomic zero-downtime full reindex
//! - `search-sync save`    — bulk upsert of the record export into the live index
//! - `search-sync delete`  — bulk delete of the record export's ids

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use search_sync::{Dependencies, SearchSyncError};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let action = std::env::args().nth(1).unwrap_or_else(|| "rebuild".to_string());

    if let Err(e) = run(&action).await {
        error!(error = %e, action = %action, "Synchronizer action failed");
        std::process::exit(1);
    }
}

async fn run(action: &str) -> Result<(), SearchSyncError> {
    let deps = Dependencies::new().await?;

    match action {
        "rebuild" => {
            let report = deps.synchronizer.rebuild_index(deps.batch_size).await?;
            info!(
                documents = report.documents_indexed,
                batches = report.batches,
                "Rebuild finished"
            );
        }
        "save" => {
            let report = deps
                .synchronizer
                .bulk_upsert(deps.records.clone(), deps.batch_size)
                .await?;
            info!(records = report.records, batches = report.batches, "Bulk save finished");
        }
        "delete" => {
            let ids: Vec<i64> = deps.records.iter().map(|r| r.id).collect();
            let report = deps.synchronizer.bulk_delete(ids, deps.batch_size).await?;
            info!(records = report.records, batches = report.batches, "Bulk delete finished");
        }
        other => {
            return Err(SearchSyncError::config(format!(
                "Unknown action '{}': expected rebuild, save, or delete",
                other
            )));
        }
    }

    Ok(())
}
