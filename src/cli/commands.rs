//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::args::Command;
use super::errors::{CliError, CliResult};
use crate::config::AppConfig;
use crate::control_plane::KnotcControlPlane;
use crate::http_server::{ApiKeyAuth, HttpServer, RateLimiter, ServerState};
use crate::observability::init_logging;
use crate::zone::{AllowList, RecordStore};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::InitConfig { output, force } => init_config(&output, force),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

/// Build the record store described by the configuration
pub fn build_store(config: &AppConfig) -> RecordStore {
    let gateway = KnotcControlPlane::new(config.knot.knotc_path.clone(), config.knot.socket());
    RecordStore::new(
        Arc::new(gateway),
        AllowList::new(&config.knot.allowed_zones),
    )
    .with_timeouts(config.knot.command_timeout(), config.knot.health_timeout())
}

/// Build the HTTP server state described by the configuration
pub fn build_state(config: &AppConfig, store: RecordStore) -> ServerState {
    ServerState {
        store,
        auth: ApiKeyAuth::from_config(&config.auth),
        rate_limiter: RateLimiter::from_config(&config.rate_limit),
    }
}

/// Start the API server
///
/// Fails before binding if knotc cannot reach the daemon.
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    init_logging(&config.log)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "starting hyprknot"
    );
    if config.knot.allowed_zones.is_empty() {
        info!("no zone allow-list configured, every zone is accessible");
    }

    let store = build_store(&config);
    let server = HttpServer::new(config.server.clone(), build_state(&config, store.clone()));

    let rt = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    rt.block_on(async {
        store.health().await.map_err(CliError::KnotUnavailable)?;
        info!("Knot DNS connection established");

        server.start().await.map_err(CliError::Server)?;
        info!("server shutdown complete");
        Ok::<(), CliError>(())
    })
}

/// Write the default configuration to `output`
pub fn init_config(output: &Path, force: bool) -> CliResult<()> {
    if output.exists() && !force {
        return Err(CliError::OutputExists(output.to_path_buf()));
    }
    AppConfig::default().save(output)?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}

/// Validate a configuration and print the effective values as JSON
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hyprknot.json");

        init_config(&path, false).unwrap();
        assert!(AppConfig::load(Some(&path)).is_ok());

        assert!(matches!(init_config(&path, false), Err(CliError::OutputExists(_))));
        assert!(init_config(&path, true).is_ok());
    }

    #[test]
    fn test_check_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hyprknot.json");
        fs::write(&path, r#"{"rate_limit": {"max_requests": 0}}"#).unwrap();

        let err = check_config(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "HYPRKNOT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_build_state_follows_config() {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        config.knot.allowed_zones = vec!["example.com".to_string()];

        let store = build_store(&config);
        assert!(store.allow_list().is_allowed("www.example.com"));
        assert!(!store.allow_list().is_allowed("example.org"));

        let state = build_state(&config, store);
        assert!(state.rate_limiter.is_none());
    }
}
