//! # Control Plane Gateway
//!
//! The single seam between this service and the zone authority. Every
//! interaction is one `knotc` subcommand producing trimmed text output or a
//! [`ZoneError::ControlPlane`](crate::zone::ZoneError::ControlPlane).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::zone::ZoneResult;

pub mod knotc;
pub mod testing;

pub use knotc::KnotcControlPlane;

/// Boxed future returned by [`ControlPlane::execute`]
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = ZoneResult<String>> + Send + 'a>>;

/// Executes one control-plane command.
///
/// `args[0]` is the subcommand (`zone-read`, `zone-begin`, ...). The call
/// must give up once `timeout` elapses.
pub trait ControlPlane: Send + Sync {
    fn execute<'a>(&'a self, args: &'a [String], timeout: Duration) -> ExecuteFuture<'a>;
}

/// Build an argument vector from string slices
pub fn command_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}
