//! # Record Validation
//!
//! Per-type checks and normalization. Validation rewrites the record in
//! place (default TTL, trailing dots, TXT quoting) and is a fixed point:
//! validating an already valid record leaves it unchanged.

use std::net::{Ipv4Addr, Ipv6Addr};

use super::errors::ValidationError;
use super::record::{Record, RecordType, DEFAULT_TTL};

type DataRule = fn(&mut Record) -> Result<(), ValidationError>;

/// Validation behaviour of one record type
struct TypeRules {
    /// Checks and normalizes `data` (and `priority` where relevant)
    data: DataRule,
    /// Whether `priority` is kept after validation
    keeps_priority: bool,
}

static A_RULES: TypeRules = TypeRules { data: ipv4_data, keeps_priority: false };
static AAAA_RULES: TypeRules = TypeRules { data: ipv6_data, keeps_priority: false };
static TARGET_RULES: TypeRules = TypeRules { data: target_data, keeps_priority: false };
static MX_RULES: TypeRules = TypeRules { data: mx_data, keeps_priority: true };
static TXT_RULES: TypeRules = TypeRules { data: txt_data, keeps_priority: false };

fn rules(record_type: RecordType) -> &'static TypeRules {
    match record_type {
        RecordType::A => &A_RULES,
        RecordType::Aaaa => &AAAA_RULES,
        RecordType::Ptr | RecordType::Cname | RecordType::Ns => &TARGET_RULES,
        RecordType::Mx => &MX_RULES,
        RecordType::Txt => &TXT_RULES,
    }
}

/// Validate and normalize a record in place.
pub fn validate(record: &mut Record) -> Result<(), ValidationError> {
    if record.name.trim().is_empty() {
        return Err(ValidationError::new("name", "record name cannot be empty"));
    }
    if record.ttl == 0 {
        record.ttl = DEFAULT_TTL;
    }

    let rules = rules(record.record_type);
    (rules.data)(record)?;
    if !rules.keeps_priority {
        record.priority = None;
    }
    Ok(())
}

/// Owned variant of [`validate`]
pub fn validated(mut record: Record) -> Result<Record, ValidationError> {
    validate(&mut record)?;
    Ok(record)
}

fn ipv4_data(record: &mut Record) -> Result<(), ValidationError> {
    record
        .data
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("data", format!("invalid IPv4 address: {}", record.data)))
}

fn ipv6_data(record: &mut Record) -> Result<(), ValidationError> {
    match record.data.parse::<Ipv6Addr>() {
        Ok(addr) if addr.to_ipv4_mapped().is_none() => Ok(()),
        _ => Err(ValidationError::new(
            "data",
            format!("invalid IPv6 address: {}", record.data),
        )),
    }
}

fn target_data(record: &mut Record) -> Result<(), ValidationError> {
    if record.data.is_empty() {
        return Err(ValidationError::new(
            "data",
            format!("data cannot be empty for {} record", record.record_type),
        ));
    }
    ensure_trailing_dot(&mut record.data);
    Ok(())
}

fn mx_data(record: &mut Record) -> Result<(), ValidationError> {
    if record.priority.is_none() {
        return Err(ValidationError::new("priority", "priority is required for MX record"));
    }
    if record.data.is_empty() {
        return Err(ValidationError::new("data", "data cannot be empty for MX record"));
    }
    ensure_trailing_dot(&mut record.data);
    Ok(())
}

fn txt_data(record: &mut Record) -> Result<(), ValidationError> {
    if record.data.is_empty() {
        return Err(ValidationError::new("data", "data cannot be empty for TXT record"));
    }
    let data = &record.data;
    let quoted = data.len() >= 2 && data.starts_with('"') && data.ends_with('"');
    if !quoted {
        record.data = format!("\"{}\"", data.trim_matches('"'));
    }
    Ok(())
}

fn ensure_trailing_dot(data: &mut String) {
    if !data.ends_with('.') {
        data.push('.');
    }
}
