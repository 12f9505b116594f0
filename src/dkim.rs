//! DKIM status as reported by an external verifier.
//!
//! Signatures are never checked here. The status comes from the caller,
//! either as a plain word (`pass`, `fail`, ...) or as the value of an
//! `Authentication-Results` header written by the receiving MTA.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DkimStatus {
    Pass,
    Fail(String),
    #[default]
    None,
    TempError,
    PermError,
}

impl DkimStatus {
    /// Lenient parse; unknown words count as `None`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pass" => DkimStatus::Pass,
            "fail" => DkimStatus::Fail("unknown failure".to_string()),
            "temperror" => DkimStatus::TempError,
            "permerror" => DkimStatus::PermError,
            _ => DkimStatus::None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, DkimStatus::Pass)
    }
}

impl fmt::Display for DkimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DkimStatus::Pass => write!(f, "pass"),
            DkimStatus::Fail(reason) => write!(f, "fail ({reason})"),
            DkimStatus::None => write!(f, "none"),
            DkimStatus::TempError => write!(f, "temperror"),
            DkimStatus::PermError => write!(f, "permerror"),
        }
    }
}

/// DKIM outcome pulled from an `Authentication-Results` header value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DkimAssessment {
    pub status: DkimStatus,
    /// `header.d=` of the reported signature
    pub signing_domain: Option<String>,
}

impl DkimAssessment {
    pub fn from_authentication_results(value: &str) -> Self {
        let value_lower = value.to_lowercase();

        // Results are `;`-separated method clauses; use the first dkim= one
        let Some(clause) = value_lower
            .split(';')
            .map(str::trim)
            .find(|clause| clause.starts_with("dkim="))
        else {
            return Self::default();
        };

        let result_word = clause["dkim=".len()..]
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();

        let status = match result_word {
            "fail" => {
                let reason = if clause.contains("signature verification failed") {
                    "signature verification failed".to_string()
                } else if clause.contains("body hash mismatch") {
                    "body hash mismatch".to_string()
                } else {
                    "unknown failure".to_string()
                };
                DkimStatus::Fail(reason)
            }
            other => DkimStatus::parse(other),
        };

        let signing_domain = clause
            .split_whitespace()
            .find_map(|token| token.strip_prefix("header.d="))
            .map(|domain| domain.trim_end_matches([';', ')', ',']).to_string())
            .filter(|domain| !domain.is_empty());

        Self {
            status,
            signing_domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(DkimStatus::parse("pass"), DkimStatus::Pass);
        assert_eq!(DkimStatus::parse(" PASS "), DkimStatus::Pass);
        assert!(matches!(DkimStatus::parse("fail"), DkimStatus::Fail(_)));
        assert_eq!(DkimStatus::parse("temperror"), DkimStatus::TempError);
        assert_eq!(DkimStatus::parse("permerror"), DkimStatus::PermError);
        assert_eq!(DkimStatus::parse("whatever"), DkimStatus::None);
        assert!(!DkimStatus::parse("none").is_pass());
    }

    #[test]
    fn test_auth_results_pass_with_domain() {
        let value = "mx.google.com; dkim=pass header.i=@example.com header.s=s1 header.d=example.com; spf=pass smtp.mailfrom=example.com";
        let assessment = DkimAssessment::from_authentication_results(value);

        assert_eq!(assessment.status, DkimStatus::Pass);
        assert_eq!(assessment.signing_domain, Some("example.com".to_string()));
    }

    #[test]
    fn test_auth_results_fail_reason() {
        let value = "mx.example.net; dkim=fail (body hash mismatch) header.d=bank.example";
        let assessment = DkimAssessment::from_authentication_results(value);

        assert_eq!(
            assessment.status,
            DkimStatus::Fail("body hash mismatch".to_string())
        );
        assert_eq!(assessment.signing_domain, Some("bank.example".to_string()));
    }

    #[test]
    fn test_auth_results_without_dkim() {
        let assessment =
            DkimAssessment::from_authentication_results("mx.example.net; spf=pass smtp.mailfrom=a.b");

        assert_eq!(assessment, DkimAssessment::default());
    }

    #[test]
    fn test_auth_results_temperror() {
        let assessment =
            DkimAssessment::from_authentication_results("mx.example.net; dkim=temperror");
        assert_eq!(assessment.status, DkimStatus::TempError);
        assert_eq!(assessment.signing_domain, None);
    }
}
