//! `knotc` process runner.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error};

use super::{ControlPlane, ExecuteFuture};
use crate::zone::ZoneError;

/// Runs subcommands through the `knotc` binary
#[derive(Debug, Clone)]
pub struct KnotcControlPlane {
    knotc_path: PathBuf,
    socket_path: Option<PathBuf>,
}

impl KnotcControlPlane {
    /// `socket_path` is passed as `-s <path>` when present
    pub fn new(knotc_path: impl Into<PathBuf>, socket_path: Option<PathBuf>) -> Self {
        Self {
            knotc_path: knotc_path.into(),
            socket_path,
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.knotc_path);
        if let Some(socket) = &self.socket_path {
            cmd.arg("-s").arg(socket);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl ControlPlane for KnotcControlPlane {
    fn execute<'a>(&'a self, args: &'a [String], timeout: Duration) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let subcommand = args.first().map(String::as_str).unwrap_or("knotc").to_string();
            debug!(knotc = %self.knotc_path.display(), ?args, "executing knotc command");

            let output = match tokio::time::timeout(timeout, self.command(args).output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    error!(command = %subcommand, error = %e, "failed to run knotc");
                    return Err(ZoneError::control_plane(
                        subcommand,
                        format!("failed to run {}: {}", self.knotc_path.display(), e),
                    ));
                }
                Err(_) => {
                    error!(command = %subcommand, ?timeout, "knotc command timed out");
                    return Err(ZoneError::control_plane(
                        subcommand,
                        format!("timed out after {:?}", timeout),
                    ));
                }
            };

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            let combined = combined.trim().to_string();

            if !output.status.success() {
                error!(command = %subcommand, status = %output.status, output = %combined, "knotc command failed");
                return Err(ZoneError::control_plane(
                    subcommand,
                    format!("{}, output: {}", output.status, combined),
                ));
            }

            debug!(command = %subcommand, output = %combined, "knotc command output");
            Ok(combined)
        })
    }
}
