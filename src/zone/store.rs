//! # Record Store
//!
//! Read, create, update, delete and reload operations over the control
//! plane. The store keeps no state between calls: the allow-list and
//! timeouts are fixed at construction and the control plane is the system
//! of record. Concurrent mutations of the same record race at the control
//! plane; the last commit wins.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use super::access::AllowList;
use super::codec;
use super::errors::{ParseError, ZoneError, ZoneResult};
use super::name::{canonical_zone, same_owner};
use super::record::{Record, RecordType, UpdateDelta};
use super::transaction::{Mutation, Transaction};
use super::validation::validate;
use crate::control_plane::{command_args, ControlPlane};

/// Default bound on CRUD, listing and reload commands
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on the `status` probe
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// What [`RecordStore::create_record`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// No record with this name and type existed
    Created(Record),
    /// A record with this name and type existed with different content
    Replaced(Record),
    /// An identical record already existed; nothing was sent
    Unchanged(Record),
}

impl CreateOutcome {
    pub fn record(&self) -> &Record {
        match self {
            Self::Created(r) | Self::Replaced(r) | Self::Unchanged(r) => r,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            Self::Created(r) | Self::Replaced(r) | Self::Unchanged(r) => r,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged(_))
    }
}

/// Transactional record operations against one control plane
#[derive(Clone)]
pub struct RecordStore {
    gateway: Arc<dyn ControlPlane>,
    allow_list: AllowList,
    command_timeout: Duration,
    health_timeout: Duration,
}

impl RecordStore {
    /// Create a store with the default timeouts
    pub fn new(gateway: Arc<dyn ControlPlane>, allow_list: AllowList) -> Self {
        Self {
            gateway,
            allow_list,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    /// Override the command and health-check timeouts
    pub fn with_timeouts(mut self, command_timeout: Duration, health_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self.health_timeout = health_timeout;
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Zones configured at the control plane and permitted by the allow-list
    pub async fn list_zones(&self) -> ZoneResult<Vec<String>> {
        let output = self.execute(command_args(["conf-read", "zone"])).await?;

        let mut zones: Vec<String> = Vec::new();
        for line in output.lines() {
            let Some(captures) = zone_line_pattern().captures(line.trim()) else {
                continue;
            };
            let zone = captures[1].to_string();
            if self.allow_list.is_allowed(&zone) && !zones.contains(&zone) {
                zones.push(zone);
            }
        }
        Ok(zones)
    }

    /// Every parseable record of `zone`.
    ///
    /// Blank lines and `;` comments are ignored; lines that fail to parse
    /// are logged and skipped.
    pub async fn list_records(&self, zone: &str) -> ZoneResult<Vec<Record>> {
        self.allow_list.check(zone)?;
        let canonical = canonical_zone(zone);
        let output = self.execute(command_args(["zone-read", canonical.as_str()])).await?;

        let mut records = Vec::new();
        for line in output.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            match codec::parse(line) {
                Ok(record) => records.push(record),
                Err(e @ ParseError::UnsupportedType(_)) => {
                    debug!(zone = %canonical, line, reason = %e, "skipping record")
                }
                Err(e) => warn!(zone = %canonical, line, error = %e, "failed to parse record"),
            }
        }
        Ok(records)
    }

    /// The first record of `zone` with this owner name and type
    pub async fn get_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> ZoneResult<Record> {
        let canonical = canonical_zone(zone);
        self.list_records(zone)
            .await?
            .into_iter()
            .find(|r| r.record_type == record_type && same_owner(&r.name, name, &canonical))
            .ok_or_else(|| ZoneError::NotFound {
                zone: zone.to_string(),
                name: name.to_string(),
                record_type: record_type.to_string(),
            })
    }

    /// Create a record, or do nothing if an identical one exists.
    ///
    /// A record with the same name and type but different content is
    /// replaced: its exact value is unset in the same transaction that sets
    /// the new one.
    pub async fn create_record(&self, zone: &str, mut record: Record) -> ZoneResult<CreateOutcome> {
        self.allow_list.check(zone)?;
        validate(&mut record)?;

        let existing = match self.get_record(zone, &record.name, record.record_type).await {
            Ok(existing) => Some(existing),
            Err(ZoneError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        match existing {
            Some(existing) if existing.same_content(&record) => {
                info!(zone, name = %record.name, record_type = %record.record_type, "record already exists with same values");
                Ok(CreateOutcome::Unchanged(record))
            }
            Some(existing) => {
                self.transact(zone, &[Mutation::Unset(&existing), Mutation::Set(&record)])
                    .await?;
                info!(zone, name = %record.name, record_type = %record.record_type, "replaced record");
                Ok(CreateOutcome::Replaced(record))
            }
            None => {
                self.transact(zone, &[Mutation::Set(&record)]).await?;
                info!(zone, name = %record.name, record_type = %record.record_type, "created record");
                Ok(CreateOutcome::Created(record))
            }
        }
    }

    /// Apply `delta` to an existing record.
    ///
    /// The old record is removed by its exact value so that siblings sharing
    /// its name and type are left untouched.
    pub async fn update_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        delta: &UpdateDelta,
    ) -> ZoneResult<Record> {
        self.allow_list.check(zone)?;
        let original = self.get_record(zone, name, record_type).await?;

        let mut updated = original.clone();
        updated.apply(delta);
        validate(&mut updated)?;

        self.transact(zone, &[Mutation::Unset(&original), Mutation::Set(&updated)])
            .await?;

        info!(zone, name = %updated.name, record_type = %record_type, "updated record");
        Ok(updated)
    }

    /// Remove a record, matched by its exact current value.
    pub async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> ZoneResult<Record> {
        self.allow_list.check(zone)?;
        let existing = self.get_record(zone, name, record_type).await?;

        self.transact(zone, &[Mutation::Unset(&existing)]).await?;

        info!(zone, name = %existing.name, record_type = %record_type, "deleted record");
        Ok(existing)
    }

    /// Reload a zone. Reload is atomic at the control plane, so no
    /// transaction is opened.
    pub async fn reload_zone(&self, zone: &str) -> ZoneResult<()> {
        self.allow_list.check(zone)?;
        let canonical = canonical_zone(zone);
        self.execute(command_args(["zone-reload", canonical.as_str()])).await?;
        info!(zone = %canonical, "reloaded zone");
        Ok(())
    }

    /// Probe the control plane with `status` under the health timeout
    pub async fn health(&self) -> ZoneResult<()> {
        let args = command_args(["status"]);
        self.gateway
            .execute(&args, self.health_timeout)
            .await
            .map(|_| ())
    }

    async fn transact(&self, zone: &str, mutations: &[Mutation<'_>]) -> ZoneResult<()> {
        let canonical = canonical_zone(zone);
        Transaction::begin(Arc::clone(&self.gateway), &canonical, self.command_timeout)
            .await?
            .apply_all(mutations)
            .await?
            .commit()
            .await
    }

    async fn execute(&self, args: Vec<String>) -> ZoneResult<String> {
        self.gateway.execute(&args, self.command_timeout).await
    }
}

fn zone_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^zone\[([^\]\s]+)\]").expect("zone pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::testing::ScriptedControlPlane;

    fn store(plane: &Arc<ScriptedControlPlane>, allowed: &[&str]) -> RecordStore {
        RecordStore::new(plane.clone(), AllowList::new(allowed.iter().copied()))
    }

    #[tokio::test]
    async fn test_list_zones_filters_and_dedupes() {
        let plane = Arc::new(
            ScriptedControlPlane::new()
                .with_zone("example.com")
                .with_zone("other.org")
                .with_zone("sub.example.com"),
        );
        let zones = store(&plane, &["example.com"]).list_zones().await.unwrap();
        assert_eq!(zones, ["example.com.", "sub.example.com."]);

        let all = store(&plane, &[]).list_zones().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_list_records_skips_bad_lines() {
        let plane = Arc::new(
            ScriptedControlPlane::new()
                .with_record("example.com", "www 300 A 192.0.2.1")
                .with_raw_line("example.com", "; comment")
                .with_raw_line("example.com", "")
                .with_raw_line("example.com", "[example.com.] example.com. 900 SOA ns. admin. 1 900 300 604800 900")
                .with_raw_line("example.com", "[example.com.] broken 3x A 192.0.2.9"),
        );
        let records = store(&plane, &[]).list_records("example.com").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "www.example.com.");
    }

    #[tokio::test]
    async fn test_list_records_fails_when_read_fails() {
        let plane = Arc::new(ScriptedControlPlane::new().with_zone("example.com"));
        plane.fail_on("zone-read");
        let err = store(&plane, &[]).list_records("example.com").await.unwrap_err();
        assert!(matches!(err, ZoneError::ControlPlane { .. }));
    }

    #[tokio::test]
    async fn test_access_denied_before_any_command() {
        let plane = Arc::new(ScriptedControlPlane::new().with_zone("other.org"));
        let store = store(&plane, &["example.com"]);
        let record = Record::new("www", RecordType::A, 300, "192.0.2.1");

        assert!(matches!(store.list_records("other.org").await, Err(ZoneError::AccessDenied(_))));
        assert!(matches!(
            store.create_record("other.org", record).await,
            Err(ZoneError::AccessDenied(_))
        ));
        assert!(matches!(
            store.delete_record("other.org", "www", RecordType::A).await,
            Err(ZoneError::AccessDenied(_))
        ));
        assert!(matches!(store.reload_zone("other.org").await, Err(ZoneError::AccessDenied(_))));
        assert!(plane.commands().is_empty());
    }

    #[tokio::test]
    async fn test_get_record_matches_relative_and_absolute_names() {
        let plane = Arc::new(
            ScriptedControlPlane::new().with_record("example.com", "test-vm.example.com. 300 A 192.0.2.1"),
        );
        let store = store(&plane, &[]);
        let by_relative = store.get_record("example.com", "test-vm", RecordType::A).await.unwrap();
        let by_absolute = store
            .get_record("example.com.", "test-vm.example.com.", RecordType::A)
            .await
            .unwrap();
        assert_eq!(by_relative, by_absolute);
        assert!(matches!(
            store.get_record("example.com", "test-vm", RecordType::Aaaa).await,
            Err(ZoneError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_validation_error_sends_nothing() {
        let plane = Arc::new(ScriptedControlPlane::new().with_zone("example.com"));
        let err = store(&plane, &[])
            .create_record("example.com", Record::new("www", RecordType::A, 300, "not-an-ip"))
            .await
            .unwrap_err();
        assert!(matches!(err, ZoneError::Validation(v) if v.field == "data"));
        assert!(plane.commands().is_empty());
    }

    #[tokio::test]
    async fn test_reload_and_health() {
        let plane = Arc::new(ScriptedControlPlane::new().with_zone("example.com"));
        let store = store(&plane, &[]);
        store.reload_zone("example.com").await.unwrap();
        store.health().await.unwrap();
        assert_eq!(plane.subcommands(), ["zone-reload", "status"]);

        plane.fail_on("status");
        assert!(store.health().await.is_err());
    }
}
