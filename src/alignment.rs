use crate::domain_utils::DomainUtils;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DMARC identifier alignment mode (`aspf=` / `adkim=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Exact match required
    Strict,
    /// Subdomains allowed
    #[default]
    Relaxed,
}

impl AlignmentMode {
    /// `s` is strict; anything else is relaxed
    pub fn parse(value: &str) -> Self {
        if value.trim() == "s" {
            AlignmentMode::Strict
        } else {
            AlignmentMode::Relaxed
        }
    }

    /// Whether `from_domain` aligns with `auth_domain` under this mode.
    ///
    /// Relaxed mode approximates organizational-domain comparison with a
    /// label-boundary suffix match: `mail.example.com` aligns with
    /// `example.com`. Without a public-suffix list this also aligns any From
    /// domain with a bare public suffix such as `co.uk`; swap in a
    /// PSL-aware comparison where that matters.
    pub fn aligns(&self, from_domain: &str, auth_domain: &str) -> bool {
        match self {
            AlignmentMode::Strict => from_domain == auth_domain,
            AlignmentMode::Relaxed => DomainUtils::is_subdomain_of(from_domain, auth_domain),
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Strict => write!(f, "strict"),
            AlignmentMode::Relaxed => write!(f, "relaxed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub spf_aligned: bool,
    pub dkim_aligned: bool,
}

pub fn check_alignment(
    from_domain: &str,
    spf_domain: &str,
    dkim_domain: &str,
    spf_mode: AlignmentMode,
    dkim_mode: AlignmentMode,
) -> AlignmentResult {
    let result = AlignmentResult {
        spf_aligned: spf_mode.aligns(from_domain, spf_domain),
        dkim_aligned: dkim_mode.aligns(from_domain, dkim_domain),
    };
    log::debug!(
        "Alignment for {from_domain}: spf={} ({spf_mode}, {spf_domain}), dkim={} ({dkim_mode}, {dkim_domain})",
        result.spf_aligned,
        result.dkim_aligned
    );
    result
}
