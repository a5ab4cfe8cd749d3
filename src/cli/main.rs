/**
 * RentSync status tool
 *
 * Prints what the local store holds and, with `--sync`, drains the pending
 * change queue against the configured rental API.
 *
 * Usage: rentsync-status [--sync] [CONFIG.toml]
 */
use clap::Parser;
use rentsync::shared::{EntityType, SyncConfig};
use rentsync::sync::{HttpRemoteApi, SyncReport};
use rentsync::SyncCore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "rentsync-status")]
#[command(about = "Show the local rental cache and pending change queue", long_about = None)]
struct Args {
    /// Drain the pending change queue against the configured API
    #[arg(long)]
    sync: bool,

    /// TOML configuration file; RENTSYNC_* environment variables override it
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = SyncConfig::load(args.config.as_deref())?;
    tracing::debug!("Loaded configuration: {:?}", config.database_path);

    let remote = Arc::new(HttpRemoteApi::new(&config)?);
    let core = SyncCore::open(&config, remote).await?;

    println!("Database: {}", config.database_path.display());
    for entity_type in EntityType::ALL {
        println!("  {:<14} {}", entity_type.as_str(), core.store.count(entity_type).await?);
    }

    let pending = core.queue.get_pending_changes().await?;
    println!("Pending changes: {}", pending.len());
    for change in &pending {
        println!(
            "  {} {} {} {} (retries: {})",
            change.timestamp.to_rfc3339(),
            change.operation.as_str(),
            change.entity_type,
            change.entity_id,
            change.retry_count
        );
    }

    match core.engine.state().last_sync_at {
        Some(at) => println!("Last sync: {}", at.to_rfc3339()),
        None => println!("Last sync: never"),
    }

    if args.sync {
        match core.monitor.handle_event(true).await {
            Some(SyncReport::Completed(summary)) => println!(
                "Sync completed: {} succeeded, {} retried, {} abandoned",
                summary.succeeded, summary.retried, summary.abandoned
            ),
            Some(SyncReport::Failed { error, .. }) => {
                return Err(format!("sync failed: {}", error).into());
            }
            Some(SyncReport::Skipped(reason)) => println!("Sync skipped: {:?}", reason),
            None => println!("Sync did not run"),
        }
        println!("Pending changes: {}", core.queue.get_pending_changes_count().await?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_sync_flag_and_config_path() {
        let args = Args::try_parse_from(["rentsync-status", "--sync", "rentsync.toml"]).unwrap();
        assert!(args.sync);
        assert_eq!(args.config, Some(PathBuf::from("rentsync.toml")));

        let args = Args::try_parse_from(["rentsync-status"]).unwrap();
        assert!(!args.sync);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["rentsync-status", "--synk"]).is_err());
    }
}
