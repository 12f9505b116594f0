//! DMARC record fields.
//!
//! A DMARC TXT record is a `;`-separated list of `tag=value` pairs published at
//! `_dmarc.<domain>`. Parsing here is deliberately forgiving: malformed
//! segments are dropped and missing tags fall back to their defaults, so the
//! parser always yields a usable field map.

use crate::alignment::AlignmentMode;
use crate::dns::RecordLookup;
use crate::policy::DmarcPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_POLICY: &str = "none";
pub const DEFAULT_ALIGNMENT: &str = "r";
pub const DEFAULT_REPORT_URI: &str = "N/A";

/// Tag/value pairs of one DMARC record, defaults backfilled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DmarcFields {
    fields: BTreeMap<String, String>,
}

/// Typed reading of the tags that decide what happens to failing mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectivePolicy {
    pub policy: DmarcPolicy,
    pub subdomain_policy: Option<DmarcPolicy>,
    pub percentage: u8,
    pub report_uri: String,
}

impl Default for DmarcFields {
    fn default() -> Self {
        Self::parse("")
    }
}

impl DmarcFields {
    /// Parse a raw record. Never fails.
    pub fn parse(record: &str) -> Self {
        let mut fields = BTreeMap::new();

        for segment in record.split(';') {
            let Some((key, value)) = segment.trim().split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            fields.insert(key.to_string(), value.trim().to_string());
        }

        for (key, default) in [
            ("p", DEFAULT_POLICY),
            ("aspf", DEFAULT_ALIGNMENT),
            ("adkim", DEFAULT_ALIGNMENT),
            ("rua", DEFAULT_REPORT_URI),
        ] {
            fields
                .entry(key.to_string())
                .or_insert_with(|| default.to_string());
        }

        Self { fields }
    }

    /// Fields of a looked-up record; defaults only when nothing was found
    pub fn from_lookup(lookup: &RecordLookup) -> Self {
        match lookup.text() {
            Some(record) => Self::parse(record),
            None => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn policy(&self) -> DmarcPolicy {
        DmarcPolicy::parse(self.get("p").unwrap_or(DEFAULT_POLICY))
    }

    /// `sp=`, the policy for subdomains, when published
    pub fn subdomain_policy(&self) -> Option<DmarcPolicy> {
        self.get("sp").map(DmarcPolicy::parse)
    }

    pub fn spf_mode(&self) -> AlignmentMode {
        AlignmentMode::parse(self.get("aspf").unwrap_or(DEFAULT_ALIGNMENT))
    }

    pub fn dkim_mode(&self) -> AlignmentMode {
        AlignmentMode::parse(self.get("adkim").unwrap_or(DEFAULT_ALIGNMENT))
    }

    /// `pct=`, clamped to 0..=100; 100 when absent or unparsable
    pub fn percentage(&self) -> u8 {
        self.get("pct")
            .and_then(|pct| pct.parse::<u32>().ok())
            .map(|pct| pct.min(100) as u8)
            .unwrap_or(100)
    }

    pub fn report_uri(&self) -> &str {
        self.get("rua").unwrap_or(DEFAULT_REPORT_URI)
    }

    pub fn effective_policy(&self) -> EffectivePolicy {
        EffectivePolicy {
            policy: self.policy(),
            subdomain_policy: self.subdomain_policy(),
            percentage: self.percentage(),
            report_uri: self.report_uri().to_string(),
        }
    }
}
