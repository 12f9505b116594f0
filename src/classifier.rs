use crate::dkim::DkimStatus;
use crate::dns::{RecordKind, RecordLookup};
use serde::{Deserialize, Serialize};
use std::fmt;

// Heuristic weights, fixed for compatibility with earlier reports
const SPF_WEIGHT: i32 = 2;
const DMARC_WEIGHT: i32 = 2;
const DKIM_WEIGHT: i32 = 2;
const HEADER_MISMATCH_PENALTY: i32 = 3;

const LEGIT_THRESHOLD: i32 = 4;
const SUSPICIOUS_THRESHOLD: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationVerdict {
    Legit,
    Suspicious,
    Spoofed,
}

impl ClassificationVerdict {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= LEGIT_THRESHOLD => ClassificationVerdict::Legit,
            s if s >= SUSPICIOUS_THRESHOLD => ClassificationVerdict::Suspicious,
            _ => ClassificationVerdict::Spoofed,
        }
    }
}

impl fmt::Display for ClassificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationVerdict::Legit => write!(f, "legit"),
            ClassificationVerdict::Suspicious => write!(f, "suspicious"),
            ClassificationVerdict::Spoofed => write!(f, "spoofed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub score: i32,
    pub verdict: ClassificationVerdict,
    pub evidence: Vec<String>,
}

/// Score the sender from record presence, DKIM status and header match.
///
/// Independent of the DMARC disposition; the two can disagree.
pub fn classify(
    spf: &RecordLookup,
    dmarc: &RecordLookup,
    dkim_status: &DkimStatus,
    header_match: bool,
) -> Classification {
    let mut score = 0;
    let mut evidence = Vec::new();

    if spf.contains_tag(RecordKind::Spf.version_tag()) {
        score += SPF_WEIGHT;
        evidence.push("SPF record published".to_string());
    } else {
        score -= SPF_WEIGHT;
        evidence.push(format!("SPF record missing ({spf})"));
    }

    if dmarc.contains_tag(RecordKind::Dmarc.version_tag()) {
        score += DMARC_WEIGHT;
        evidence.push("DMARC record published".to_string());
    } else {
        score -= DMARC_WEIGHT;
        evidence.push(format!("DMARC record missing ({dmarc})"));
    }

    if dkim_status.is_pass() {
        score += DKIM_WEIGHT;
        evidence.push("DKIM passed".to_string());
    } else {
        score -= DKIM_WEIGHT;
        evidence.push(format!("DKIM did not pass ({dkim_status})"));
    }

    if !header_match {
        score -= HEADER_MISMATCH_PENALTY;
        evidence.push("From header does not match sender".to_string());
    }

    let verdict = ClassificationVerdict::from_score(score);
    log::debug!("Classification score {score} -> {verdict}");

    Classification {
        score,
        verdict,
        evidence,
    }
}
