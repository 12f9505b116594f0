use crate::dns::{RecordKind, RecordLookup};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse verdict from record presence alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictSummary {
    Legitimate,
    PartialSpfOnly,
    PartialDmarcOnly,
    PossiblySpoofed,
}

impl VerdictSummary {
    pub fn from_records(spf: &RecordLookup, dmarc: &RecordLookup) -> Self {
        let has_spf = spf.contains_tag(RecordKind::Spf.version_tag());
        let has_dmarc = dmarc.contains_tag(RecordKind::Dmarc.version_tag());

        match (has_spf, has_dmarc) {
            (true, true) => VerdictSummary::Legitimate,
            (true, false) => VerdictSummary::PartialSpfOnly,
            (false, true) => VerdictSummary::PartialDmarcOnly,
            (false, false) => VerdictSummary::PossiblySpoofed,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            VerdictSummary::Legitimate => "✅",
            VerdictSummary::PartialSpfOnly | VerdictSummary::PartialDmarcOnly => "⚠️",
            VerdictSummary::PossiblySpoofed => "❌",
        }
    }
}

impl fmt::Display for VerdictSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictSummary::Legitimate => write!(f, "Legitimate (SPF & DMARC configured)"),
            VerdictSummary::PartialSpfOnly => write!(f, "Partial (Only SPF configured)"),
            VerdictSummary::PartialDmarcOnly => write!(f, "Partial (Only DMARC configured)"),
            VerdictSummary::PossiblySpoofed => {
                write!(f, "Possibly Spoofed (No SPF/DMARC found)")
            }
        }
    }
}
