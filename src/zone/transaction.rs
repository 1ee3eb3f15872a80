//! # Zone Transactions
//!
//! Wraps `zone-begin` / `zone-set` / `zone-unset` / `zone-commit` /
//! `zone-abort` in a guard object.
//!
//! ## Invariants
//! - A failure after `zone-begin` is followed by `zone-abort` before the
//!   error reaches the caller.
//! - The error returned is always the first one; a failed abort is logged
//!   and never replaces it.
//! - A guard dropped while still open (cancelled request, panic) schedules
//!   a best-effort abort on the current runtime.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use super::codec;
use super::errors::{ZoneError, ZoneResult};
use super::name::relative_owner;
use super::record::Record;
use crate::control_plane::ControlPlane;

/// A single change staged inside a transaction
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    /// Add the record (`zone-set`)
    Set(&'a Record),
    /// Remove exactly this record, matched on owner, type and rdata (`zone-unset`)
    Unset(&'a Record),
}

/// An open control-plane transaction on one zone
pub struct Transaction {
    gateway: Arc<dyn ControlPlane>,
    zone: String,
    timeout: Duration,
    open: bool,
}

impl Transaction {
    /// Open a transaction with `zone-begin`. `zone` must be canonical.
    pub async fn begin(
        gateway: Arc<dyn ControlPlane>,
        zone: &str,
        timeout: Duration,
    ) -> ZoneResult<Self> {
        let mut tx = Self {
            gateway,
            zone: zone.to_string(),
            timeout,
            open: false,
        };
        tx.run(vec!["zone-begin".to_string(), tx.zone.clone()]).await?;
        tx.open = true;
        Ok(tx)
    }

    /// Stage one mutation
    pub async fn apply(&mut self, mutation: Mutation<'_>) -> ZoneResult<()> {
        let (subcommand, rest) = match mutation {
            Mutation::Set(record) => (
                "zone-set",
                codec::set_args(&relative_owner(&record.name, &self.zone), record),
            ),
            Mutation::Unset(record) => (
                "zone-unset",
                codec::unset_args(&relative_owner(&record.name, &self.zone), record),
            ),
        };
        let mut args = vec![subcommand.to_string(), self.zone.clone()];
        args.extend(rest);
        self.run(args).await.map(|_| ())
    }

    /// Stage every mutation in order, aborting on the first failure
    pub async fn apply_all(mut self, mutations: &[Mutation<'_>]) -> ZoneResult<Self> {
        for mutation in mutations {
            if let Err(e) = self.apply(*mutation).await {
                return Err(self.abort(e).await);
            }
        }
        Ok(self)
    }

    /// Commit with `zone-commit`. A failed commit is aborted and its error
    /// returned.
    pub async fn commit(mut self) -> ZoneResult<()> {
        let args = vec!["zone-commit".to_string(), self.zone.clone()];
        match self.run(args).await {
            Ok(_) => {
                self.open = false;
                Ok(())
            }
            Err(e) => Err(self.abort(e).await),
        }
    }

    /// Abort with `zone-abort` and hand back `cause` unchanged
    pub async fn abort(mut self, cause: ZoneError) -> ZoneError {
        let args = vec!["zone-abort".to_string(), self.zone.clone()];
        let result = self.run(args).await;
        self.open = false;
        if let Err(abort_err) = result {
            error!(
                zone = %self.zone,
                cause = %cause,
                error = %abort_err,
                "failed to abort transaction"
            );
        }
        cause
    }

    async fn run(&self, args: Vec<String>) -> ZoneResult<String> {
        self.gateway.execute(&args, self.timeout).await
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        warn!(zone = %self.zone, "transaction dropped while open, aborting");
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            error!(zone = %self.zone, "no runtime available to abort transaction");
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let zone = self.zone.clone();
        let timeout = self.timeout;
        handle.spawn(async move {
            let args = vec!["zone-abort".to_string(), zone.clone()];
            if let Err(e) = gateway.execute(&args, timeout).await {
                error!(zone = %zone, error = %e, "failed to abort dropped transaction");
            }
        });
    }
}
