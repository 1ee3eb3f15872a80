//! In-memory stand-in for `knotc`.
//!
//! [`ScriptedControlPlane`] keeps committed zone contents plus one staged
//! transaction per zone, answers the subset of subcommands the store uses,
//! records every command it receives, and can be told to fail chosen
//! subcommands.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::{ControlPlane, ExecuteFuture};
use crate::zone::name::{canonical_zone, qualify_owner};
use crate::zone::{codec, Record, ZoneError, ZoneResult};

#[derive(Debug, Default)]
struct State {
    committed: BTreeMap<String, Vec<Record>>,
    staged: HashMap<String, Vec<Record>>,
    commands: Vec<Vec<String>>,
    failures: HashSet<String>,
    extra_lines: HashMap<String, Vec<String>>,
}

/// Simulated control plane for tests and local development
#[derive(Debug, Default)]
pub struct ScriptedControlPlane {
    state: Mutex<State>,
}

impl ScriptedControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty zone to the configuration
    pub fn with_zone(self, zone: &str) -> Self {
        self.lock().committed.entry(canonical_zone(zone)).or_default();
        self
    }

    /// Add a committed record, given as a zone-read line
    pub fn with_record(self, zone: &str, line: &str) -> Self {
        let zone = canonical_zone(zone);
        let mut record = codec::parse(line).expect("seed record must parse");
        record.name = qualify_owner(&record.name, &zone);
        self.lock().committed.entry(zone).or_default().push(record);
        self
    }

    /// Emit an extra raw line in the zone-read output
    pub fn with_raw_line(self, zone: &str, line: &str) -> Self {
        self.lock()
            .extra_lines
            .entry(canonical_zone(zone))
            .or_default()
            .push(line.to_string());
        self
    }

    /// Make every future invocation of `subcommand` fail
    pub fn fail_on(&self, subcommand: &str) {
        self.lock().failures.insert(subcommand.to_string());
    }

    /// Every command received so far, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock().commands.clone()
    }

    /// Subcommand names received so far, in order
    pub fn subcommands(&self) -> Vec<String> {
        self.lock()
            .commands
            .iter()
            .filter_map(|c| c.first().cloned())
            .collect()
    }

    /// Forget the recorded command history
    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    /// Committed records of a zone
    pub fn records(&self, zone: &str) -> Vec<Record> {
        self.lock()
            .committed
            .get(&canonical_zone(zone))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a transaction is open on `zone`
    pub fn has_open_transaction(&self, zone: &str) -> bool {
        self.lock().staged.contains_key(&canonical_zone(zone))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run(&self, args: &[String]) -> ZoneResult<String> {
        let mut state = self.lock();
        state.commands.push(args.to_vec());

        let subcommand = args.first().cloned().unwrap_or_default();
        if state.failures.contains(&subcommand) {
            return Err(ZoneError::control_plane(&subcommand, "injected failure"));
        }
        let fail = |detail: &str| Err(ZoneError::control_plane(&subcommand, detail));
        let zone = args.get(1).map(|z| canonical_zone(z));

        match (subcommand.as_str(), zone) {
            ("status", _) => Ok("Running".to_string()),
            ("conf-read", _) => Ok(state
                .committed
                .keys()
                .flat_map(|z| [format!("zone[{}]", z), format!("zone[{}].file = \"{}zone\"", z, z)])
                .collect::<Vec<_>>()
                .join("\n")),
            ("zone-read", Some(zone)) => {
                let Some(records) = state.committed.get(&zone) else {
                    return fail("error: (no such zone found)");
                };
                let mut lines: Vec<String> = records
                    .iter()
                    .map(|r| format!("[{}] {}", zone, codec::format(r)))
                    .collect();
                if let Some(extra) = state.extra_lines.get(&zone) {
                    lines.extend(extra.iter().cloned());
                }
                Ok(lines.join("\n"))
            }
            ("zone-begin", Some(zone)) => {
                if state.staged.contains_key(&zone) {
                    return fail("error: (too many transactions)");
                }
                let Some(records) = state.committed.get(&zone).cloned() else {
                    return fail("error: (no such zone found)");
                };
                state.staged.insert(zone, records);
                Ok("OK".to_string())
            }
            ("zone-commit", Some(zone)) => match state.staged.remove(&zone) {
                Some(records) => {
                    state.committed.insert(zone, records);
                    Ok("OK".to_string())
                }
                None => fail("error: (no active transaction)"),
            },
            ("zone-abort", Some(zone)) => match state.staged.remove(&zone) {
                Some(_) => Ok("OK".to_string()),
                None => fail("error: (no active transaction)"),
            },
            ("zone-set", Some(zone)) => {
                let Some(staged) = state.staged.get_mut(&zone) else {
                    return fail("error: (no active transaction)");
                };
                let line = args[2..].join(" ");
                let Ok(mut record) = codec::parse(&line) else {
                    return fail("error: (malformed data)");
                };
                record.name = qualify_owner(&record.name, &zone);
                if !staged.contains(&record) {
                    staged.push(record);
                }
                Ok("OK".to_string())
            }
            ("zone-unset", Some(zone)) => {
                let Some(staged) = state.staged.get_mut(&zone) else {
                    return fail("error: (no active transaction)");
                };
                let owner = args.get(2).map(|o| qualify_owner(o, &zone)).unwrap_or_default();
                let record_type = args.get(3).cloned();
                let rdata = args.get(4..).filter(|r| !r.is_empty()).map(|r| r.join(" "));

                let before = staged.len();
                staged.retain(|r| {
                    let matches = r.name == owner
                        && record_type
                            .as_deref()
                            .map_or(true, |t| r.record_type.as_str().eq_ignore_ascii_case(t))
                        && rdata.as_deref().map_or(true, |d| rdata_of(r) == d);
                    !matches
                });
                if staged.len() == before {
                    return fail("error: (no such record in zone found)");
                }
                Ok("OK".to_string())
            }
            ("zone-reload", Some(zone)) => {
                if state.committed.contains_key(&zone) {
                    Ok("OK".to_string())
                } else {
                    fail("error: (no such zone found)")
                }
            }
            _ => fail("error: (invalid command)"),
        }
    }
}

fn rdata_of(record: &Record) -> String {
    match record.priority {
        Some(p) if record.record_type.has_priority() => format!("{} {}", p, record.data),
        _ => record.data.clone(),
    }
}

impl ControlPlane for ScriptedControlPlane {
    fn execute<'a>(&'a self, args: &'a [String], _timeout: Duration) -> ExecuteFuture<'a> {
        Box::pin(async move { self.run(args) })
    }
}
