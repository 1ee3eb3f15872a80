//! # Record Codec
//!
//! Reads and writes the line-oriented record format printed by
//! `knotc zone-read`:
//!
//! ```text
//! [example.com.] www.example.com. 300 IN A 192.0.2.1
//! [example.com.] example.com. 300 MX 10 mail.example.com.
//! ```
//!
//! The bracketed zone prefix and the class token are both optional on input.
//! Output always carries the `IN` class and never the zone prefix.

use super::errors::ParseError;
use super::record::{Record, RecordType};

/// Class tokens that may sit between the TTL and the type
pub const CLASS_TOKENS: [&str; 3] = ["IN", "CH", "HS"];

/// Class written by [`format`]
pub const DEFAULT_CLASS: &str = "IN";

/// Parse one record line.
pub fn parse(line: &str) -> Result<Record, ParseError> {
    let body = strip_zone_prefix(line.trim());
    let parts: Vec<&str> = body.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ParseError::TooFewFields(parts.len()));
    }

    let name = parts[0];
    let ttl = parts[1]
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidTtl(parts[1].to_string()))?;

    let type_index = if parts.len() >= 5 && CLASS_TOKENS.contains(&parts[2]) {
        3
    } else {
        2
    };
    let record_type: RecordType = parts[type_index].parse()?;

    let mut data_start = type_index + 1;
    let mut priority = None;
    if record_type.has_priority() {
        let token = parts.get(data_start).ok_or(ParseError::MissingExchange)?;
        priority = Some(
            token
                .parse::<u16>()
                .map_err(|_| ParseError::InvalidPriority(token.to_string()))?,
        );
        data_start += 1;
        if data_start >= parts.len() {
            return Err(ParseError::MissingExchange);
        }
    }

    Ok(Record {
        name: name.to_string(),
        record_type,
        ttl,
        data: parts.get(data_start..).unwrap_or_default().join(" "),
        priority,
    })
}

/// Format a record as a single line, inverse of [`parse`]
pub fn format(record: &Record) -> String {
    let ttl = record.ttl.to_string();
    let mut parts = vec![record.name.as_str(), ttl.as_str(), DEFAULT_CLASS, record.record_type.as_str()];
    let priority = priority_token(record);
    if let Some(p) = &priority {
        parts.push(p.as_str());
    }
    parts.push(record.data.as_str());
    parts.join(" ")
}

/// Arguments after `zone-set <zone>`: owner, TTL, type, [priority], data
pub fn set_args(owner: &str, record: &Record) -> Vec<String> {
    let mut args = vec![
        owner.to_string(),
        record.ttl.to_string(),
        record.record_type.as_str().to_string(),
    ];
    args.extend(priority_token(record));
    args.push(record.data.clone());
    args
}

/// Arguments after `zone-unset <zone>` selecting exactly this record:
/// owner, type, [priority], data
pub fn unset_args(owner: &str, record: &Record) -> Vec<String> {
    let mut args = vec![owner.to_string(), record.record_type.as_str().to_string()];
    args.extend(priority_token(record));
    args.push(record.data.clone());
    args
}

fn priority_token(record: &Record) -> Option<String> {
    if record.record_type.has_priority() {
        record.priority.map(|p| p.to_string())
    } else {
        None
    }
}

fn strip_zone_prefix(line: &str) -> &str {
    if line.starts_with('[') {
        if let Some(end) = line.find(']') {
            return line[end + 1..].trim_start();
        }
    }
    line
}
