use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOMAIN_PART: Regex = Regex::new(r"^[\w.-]+$").unwrap();
}

/// Minimal domain hierarchy utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Extract domain from email address
    ///
    /// Accepts a bare address or a `Name <user@example.com>` form. Returns
    /// `None` when there is no `@`, when either side of it is empty, or when
    /// the domain part holds anything other than word characters, dots and
    /// hyphens.
    pub fn extract_domain(email: &str) -> Option<String> {
        let address = Self::strip_display_name(email.trim());

        let at_pos = address.rfind('@')?;
        if at_pos == 0 {
            return None;
        }

        let domain = &address[at_pos + 1..];
        if !DOMAIN_PART.is_match(domain) {
            return None;
        }

        let domain = Self::normalize_domain(domain);
        if domain.is_empty() {
            return None;
        }
        Some(domain)
    }

    /// Lowercase a DNS name and drop the root dot so names compare as text
    pub fn normalize_domain(domain: &str) -> String {
        domain.trim().trim_end_matches('.').to_lowercase()
    }

    fn strip_display_name(value: &str) -> &str {
        if let (Some(start), Some(end)) = (value.rfind('<'), value.rfind('>')) {
            if start < end {
                return value[start + 1..end].trim();
            }
        }
        value
    }

    /// Check if `domain` equals `parent` or sits below it.
    /// Examples:
    /// - is_subdomain_of("mail.example.com", "example.com") -> true
    /// - is_subdomain_of("example.com", "mail.example.com") -> false
    /// - is_subdomain_of("notexample.com", "example.com") -> false
    pub fn is_subdomain_of(domain: &str, parent: &str) -> bool {
        if parent.is_empty() {
            return false;
        }
        if domain == parent {
            return true;
        }

        domain
            .strip_suffix(parent)
            .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Name queried for a domain's DMARC policy
    pub fn dmarc_query_name(domain: &str) -> String {
        format!("_dmarc.{}", domain.trim_end_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            DomainUtils::extract_domain("user@example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            DomainUtils::extract_domain("  First.Last@Mail.Example-Corp.co.uk \n"),
            Some("mail.example-corp.co.uk".to_string())
        );
        assert_eq!(DomainUtils::extract_domain("invalid"), None);
    }

    #[test]
    fn test_extract_domain_display_name() {
        assert_eq!(
            DomainUtils::extract_domain("\"Billing Team\" <billing@paypal.com>"),
            Some("paypal.com".to_string())
        );
    }

    #[test]
    fn test_extract_domain_rejects_malformed() {
        for input in [
            "",
            "@",
            "@example.com",
            "user@",
            "user@.",
            "user@exa!mple.com",
            "user@example.com; drop",
            "user@ example.com",
            "no-at-sign.example.com",
        ] {
            assert_eq!(DomainUtils::extract_domain(input), None, "input: {input:?}");
        }
    }

    #[test]
    fn test_extract_domain_uses_last_at() {
        assert_eq!(
            DomainUtils::extract_domain("odd@local@example.org"),
            Some("example.org".to_string())
        );
    }

    #[test]
    fn test_is_subdomain_of() {
        assert!(DomainUtils::is_subdomain_of("example.com", "example.com"));
        assert!(DomainUtils::is_subdomain_of("mail.example.com", "example.com"));
        assert!(DomainUtils::is_subdomain_of("a.b.example.com", "example.com"));
        assert!(!DomainUtils::is_subdomain_of("example.com", "mail.example.com"));
        assert!(!DomainUtils::is_subdomain_of("notexample.com", "example.com"));
        assert!(!DomainUtils::is_subdomain_of("example.com", ""));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(DomainUtils::normalize_domain("Example.COM."), "example.com");
        assert_eq!(DomainUtils::normalize_domain(" mail.example.com "), "mail.example.com");
    }

    #[test]
    fn test_dmarc_query_name() {
        assert_eq!(DomainUtils::dmarc_query_name("example.com"), "_dmarc.example.com");
        assert_eq!(DomainUtils::dmarc_query_name("example.com."), "_dmarc.example.com");
    }
}
