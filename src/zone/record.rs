//! # Record Model
//!
//! The record value object exchanged with HTTP callers and parsed from
//! `knotc zone-read` output.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::errors::ParseError;

/// TTL applied when a record arrives with a TTL of zero
pub const DEFAULT_TTL: u32 = 300;

/// Record types managed through this service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Ptr,
    Cname,
    Mx,
    Txt,
    Ns,
}

impl RecordType {
    /// Every managed type, in presentation order
    pub const ALL: [RecordType; 7] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Ptr,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Txt,
        RecordType::Ns,
    ];

    /// Returns the mnemonic used in zone data
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Ptr => "PTR",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
        }
    }

    /// Whether the rdata starts with a numeric preference
    pub fn has_priority(&self) -> bool {
        matches!(self, RecordType::Mx)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnsupportedType(s.to_string()))
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A single resource record.
///
/// `priority` is only meaningful for MX records; validation clears it for
/// every other type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub ttl: u32,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl Record {
    pub fn new(name: impl Into<String>, record_type: RecordType, ttl: u32, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            data: data.into(),
            priority: None,
        }
    }

    /// Builder-style MX preference
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// True when TTL, data and priority all match.
    ///
    /// Identity (name and type) is not compared.
    pub fn same_content(&self, other: &Record) -> bool {
        self.ttl == other.ttl && self.data == other.data && self.priority == other.priority
    }

    /// Apply the present fields of an update
    pub fn apply(&mut self, delta: &UpdateDelta) {
        if let Some(ttl) = delta.ttl {
            self.ttl = ttl;
        }
        if let Some(data) = &delta.data {
            self.data = data.clone();
        }
        if let Some(priority) = delta.priority {
            self.priority = Some(priority);
        }
    }
}

/// Partial update of an existing record. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl UpdateDelta {
    pub fn is_empty(&self) -> bool {
        self.ttl.is_none() && self.data.is_none() && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parse_is_case_insensitive() {
        assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert_eq!("Mx".parse::<RecordType>().unwrap(), RecordType::Mx);
        assert!(matches!(
            "SOA".parse::<RecordType>(),
            Err(ParseError::UnsupportedType(t)) if t == "SOA"
        ));
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::new("mail", RecordType::Mx, 300, "mx.example.com.").with_priority(10);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "MX");
        assert_eq!(json["priority"], 10);

        let a: Record =
            serde_json::from_str(r#"{"name":"www","type":"a","data":"192.0.2.1"}"#).unwrap();
        assert_eq!(a.record_type, RecordType::A);
        assert_eq!(a.ttl, 0);
        assert!(a.priority.is_none());
        assert!(!serde_json::to_string(&a).unwrap().contains("priority"));
    }

    #[test]
    fn test_apply_only_present_fields() {
        let mut record = Record::new("mail", RecordType::Mx, 600, "mx1.example.com.").with_priority(10);
        record.apply(&UpdateDelta {
            ttl: None,
            data: Some("mx2.example.com.".to_string()),
            priority: None,
        });
        assert_eq!(record.ttl, 600);
        assert_eq!(record.data, "mx2.example.com.");
        assert_eq!(record.priority, Some(10));
        assert!(UpdateDelta::default().is_empty());
    }
}
