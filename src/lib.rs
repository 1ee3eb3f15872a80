//! hyprknot - HTTP API for Knot DNS zone records
//!
//! Every change goes through a knotc transaction: `zone-begin`, one or more
//! `zone-set`/`zone-unset`, then `zone-commit`, with `zone-abort` on any
//! failure.

pub mod cli;
pub mod config;
pub mod control_plane;
pub mod http_server;
pub mod observability;
pub mod zone;
