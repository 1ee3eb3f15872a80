//! # Zone Access Guard
//!
//! Restricts every zone-scoped operation to a configured allow-list. An
//! empty list grants access to every zone.

use super::errors::{ZoneError, ZoneResult};
use super::name::canonical_zone;

/// Zones this service may touch, held in canonical form
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    zones: Vec<String>,
}

impl AllowList {
    /// Build an allow-list from configured zone names
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = Vec::new();
        for zone in zones {
            let zone = canonical_zone(zone.as_ref());
            if !canonical.contains(&zone) {
                canonical.push(zone);
            }
        }
        Self { zones: canonical }
    }

    /// Allow-list that permits every zone
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.zones.is_empty()
    }

    /// Configured entries in canonical form
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Whether `zone` equals an entry or is a subdomain of one.
    ///
    /// Suffix matches are anchored on a label boundary, so `notexample.com`
    /// is not covered by `example.com`.
    pub fn is_allowed(&self, zone: &str) -> bool {
        if self.zones.is_empty() {
            return true;
        }
        let zone = canonical_zone(zone);
        self.zones
            .iter()
            .any(|allowed| zone == *allowed || zone.ends_with(&format!(".{}", allowed)))
    }

    /// [`is_allowed`](Self::is_allowed) as a `Result`
    pub fn check(&self, zone: &str) -> ZoneResult<()> {
        if self.is_allowed(zone) {
            Ok(())
        } else {
            Err(ZoneError::AccessDenied(zone.to_string()))
        }
    }
}
