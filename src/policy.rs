use crate::alignment::AlignmentResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DMARC policy actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmarcPolicy {
    /// No action (monitoring mode)
    #[default]
    None,
    /// Mark as spam but deliver
    Quarantine,
    /// Reject the message
    Reject,
}

impl DmarcPolicy {
    /// Unknown values fall back to `None`
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "quarantine" => DmarcPolicy::Quarantine,
            "reject" => DmarcPolicy::Reject,
            _ => DmarcPolicy::None,
        }
    }
}

impl fmt::Display for DmarcPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmarcPolicy::None => write!(f, "none"),
            DmarcPolicy::Quarantine => write!(f, "quarantine"),
            DmarcPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Terminal decision for one message evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyDisposition {
    PassViaSpf,
    PassViaDkim,
    Rejected,
    Quarantined,
    AllowedNone,
}

impl PolicyDisposition {
    pub fn is_pass(&self) -> bool {
        matches!(
            self,
            PolicyDisposition::PassViaSpf | PolicyDisposition::PassViaDkim
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            PolicyDisposition::PassViaSpf => "DMARC pass (SPF aligned)",
            PolicyDisposition::PassViaDkim => "DMARC pass (DKIM aligned)",
            PolicyDisposition::Rejected => "DMARC fail, policy says reject",
            PolicyDisposition::Quarantined => "DMARC fail, policy says quarantine",
            PolicyDisposition::AllowedNone => "DMARC fail, policy is none (monitoring only)",
        }
    }
}

impl fmt::Display for PolicyDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyDisposition::PassViaSpf => "pass-via-spf",
            PolicyDisposition::PassViaDkim => "pass-via-dkim",
            PolicyDisposition::Rejected => "rejected",
            PolicyDisposition::Quarantined => "quarantined",
            PolicyDisposition::AllowedNone => "allowed-none",
        };
        write!(f, "{name}")
    }
}

/// Resolve the DMARC disposition.
///
/// An aligned SPF pass wins first, then an aligned DKIM pass; only when
/// neither holds is the published policy consulted.
pub fn resolve_policy(
    spf_passed: bool,
    dkim_passed: bool,
    alignment: AlignmentResult,
    policy: DmarcPolicy,
) -> PolicyDisposition {
    if spf_passed && alignment.spf_aligned {
        return PolicyDisposition::PassViaSpf;
    }
    if dkim_passed && alignment.dkim_aligned {
        return PolicyDisposition::PassViaDkim;
    }

    match policy {
        DmarcPolicy::Reject => PolicyDisposition::Rejected,
        DmarcPolicy::Quarantine => PolicyDisposition::Quarantined,
        DmarcPolicy::None => PolicyDisposition::AllowedNone,
    }
}
