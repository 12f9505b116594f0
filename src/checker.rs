use crate::alignment::{check_alignment, AlignmentResult};
use crate::classifier::{classify, Classification};
use crate::dkim::{DkimAssessment, DkimStatus};
use crate::dmarc::{DmarcFields, EffectivePolicy};
use crate::dns::{RecordFetcher, RecordKind, RecordLookup, TxtResolver};
use crate::domain_utils::DomainUtils;
use crate::error::{Result, SpoofCheckError};
use crate::policy::{resolve_policy, PolicyDisposition};
use crate::verdict::VerdictSummary;
use serde::Serialize;
use std::sync::Arc;

/// Per-check inputs that DNS cannot answer
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Supplied by a real verifier; never computed here
    pub dkim_status: DkimStatus,
    /// Whether the visible From header matched the envelope sender
    pub header_match: bool,
    /// SPF-validated domain, defaults to the From domain
    pub spf_domain: Option<String>,
    /// DKIM `d=` domain, defaults to the From domain
    pub dkim_domain: Option<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            dkim_status: DkimStatus::None,
            header_match: true,
            spf_domain: None,
            dkim_domain: None,
        }
    }
}

impl CheckOptions {
    /// Take DKIM status and signing domain from an `Authentication-Results` value
    pub fn with_authentication_results(mut self, value: &str) -> Self {
        let assessment = DkimAssessment::from_authentication_results(value);
        self.dkim_status = assessment.status;
        if assessment.signing_domain.is_some() {
            self.dkim_domain = assessment.signing_domain;
        }
        self
    }
}

/// Everything one check produced, handed to presentation as-is
#[derive(Debug, Clone, Serialize)]
pub struct SpoofReport {
    pub email: String,
    pub domain: String,
    pub spf: RecordLookup,
    pub dmarc: RecordLookup,
    pub dmarc_fields: DmarcFields,
    pub effective_policy: EffectivePolicy,
    pub spf_domain: String,
    pub dkim_domain: String,
    pub spf_passed: bool,
    pub dkim_status: DkimStatus,
    pub alignment: AlignmentResult,
    pub disposition: PolicyDisposition,
    pub classification: Classification,
    pub summary: VerdictSummary,
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub email: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Report(Box<SpoofReport>),
    Error { message: String },
}

impl BatchOutcome {
    fn from_result(result: Result<SpoofReport>) -> Self {
        match result {
            Ok(report) => BatchOutcome::Report(Box::new(report)),
            Err(e) => BatchOutcome::Error {
                message: e.to_string(),
            },
        }
    }

    /// A check task that panicked or was cancelled, outside the lookup errors
    fn task_failed(error: &tokio::task::JoinError) -> Self {
        BatchOutcome::Error {
            message: format!("check task failed: {error}"),
        }
    }
}

/// Addresses listed one per line; blank lines and `#` comments are skipped
pub fn parse_batch_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub struct SpoofChecker<R> {
    fetcher: RecordFetcher<R>,
}

impl<R: TxtResolver> SpoofChecker<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            fetcher: RecordFetcher::new(resolver),
        }
    }

    pub async fn check(&self, email: &str, options: &CheckOptions) -> Result<SpoofReport> {
        let domain = DomainUtils::extract_domain(email)
            .ok_or_else(|| SpoofCheckError::InvalidEmailFormat(email.to_string()))?;
        log::info!("Checking sender domain {domain}");

        let (spf, dmarc) = tokio::join!(
            self.fetcher.fetch(&domain, RecordKind::Spf),
            self.fetcher.fetch(&domain, RecordKind::Dmarc)
        );

        Ok(Self::evaluate(email, domain, spf, dmarc, options))
    }

    /// Pure evaluation of already fetched records
    pub fn evaluate(
        email: &str,
        domain: String,
        spf: RecordLookup,
        dmarc: RecordLookup,
        options: &CheckOptions,
    ) -> SpoofReport {
        let dmarc_fields = DmarcFields::from_lookup(&dmarc);
        let effective_policy = dmarc_fields.effective_policy();

        let spf_domain = options
            .spf_domain
            .as_deref()
            .map_or_else(|| domain.clone(), DomainUtils::normalize_domain);
        let dkim_domain = options
            .dkim_domain
            .as_deref()
            .map_or_else(|| domain.clone(), DomainUtils::normalize_domain);

        let alignment = check_alignment(
            &domain,
            &spf_domain,
            &dkim_domain,
            dmarc_fields.spf_mode(),
            dmarc_fields.dkim_mode(),
        );

        // A published SPF record stands in for an SPF pass
        let spf_passed = spf.contains_tag(RecordKind::Spf.version_tag());
        let disposition = resolve_policy(
            spf_passed,
            options.dkim_status.is_pass(),
            alignment,
            dmarc_fields.policy(),
        );

        let classification = classify(&spf, &dmarc, &options.dkim_status, options.header_match);
        let summary = VerdictSummary::from_records(&spf, &dmarc);

        log::debug!(
            "{domain}: disposition={disposition}, classification={}, summary={summary:?}",
            classification.verdict
        );

        SpoofReport {
            email: email.to_string(),
            domain,
            spf,
            dmarc,
            dmarc_fields,
            effective_policy,
            spf_domain,
            dkim_domain,
            spf_passed,
            dkim_status: options.dkim_status.clone(),
            alignment,
            disposition,
            classification,
            summary,
        }
    }
}

impl<R: TxtResolver + 'static> SpoofChecker<R> {
    /// Check every address as its own task; entries come back in input order
    pub async fn check_batch(
        checker: Arc<Self>,
        emails: Vec<String>,
        options: CheckOptions,
    ) -> Vec<BatchEntry> {
        let mut handles = Vec::with_capacity(emails.len());
        for email in &emails {
            let checker = Arc::clone(&checker);
            let options = options.clone();
            let email = email.clone();
            handles.push(tokio::spawn(async move {
                checker.check(&email, &options).await
            }));
        }

        let mut entries = Vec::with_capacity(emails.len());
        for (email, handle) in emails.into_iter().zip(handles) {
            let outcome = match handle.await {
                Ok(result) => BatchOutcome::from_result(result),
                Err(e) => {
                    log::warn!("Check task for {email} aborted: {e}");
                    BatchOutcome::task_failed(&e)
                }
            };
            entries.push(BatchEntry { email, outcome });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationVerdict;
    use crate::dns::StaticResolver;

    fn example_resolver() -> StaticResolver {
        StaticResolver::new()
            .with_records(
                "example.com",
                &["v=spf1 include:_spf.example.com ~all", "some-verification=1"],
            )
            .with_records("_dmarc.example.com", &["v=DMARC1; p=quarantine"])
            .with_records("strict.example", &["v=spf1 -all"])
            .with_records(
                "_dmarc.strict.example",
                &["v=DMARC1; p=reject; aspf=s; adkim=s; rua=mailto:d@strict.example"],
            )
            .with_failure("_dmarc.flaky.test", "timed out")
            .with_records("flaky.test", &["v=spf1 ~all"])
    }

    #[tokio::test]
    async fn test_invalid_email_stops_early() {
        let checker = SpoofChecker::new(example_resolver());
        let result = checker.check("not-an-email", &CheckOptions::default()).await;

        assert_eq!(
            result.unwrap_err(),
            SpoofCheckError::InvalidEmailFormat("not-an-email".to_string())
        );
    }

    #[tokio::test]
    async fn test_fully_configured_domain() {
        let checker = SpoofChecker::new(example_resolver());
        let options = CheckOptions {
            dkim_status: DkimStatus::Pass,
            ..CheckOptions::default()
        };
        let report = checker.check("alice@example.com", &options).await.unwrap();

        assert_eq!(report.domain, "example.com");
        assert_eq!(report.summary, VerdictSummary::Legitimate);
        assert_eq!(report.classification.score, 6);
        assert_eq!(report.classification.verdict, ClassificationVerdict::Legit);
        assert_eq!(report.disposition, PolicyDisposition::PassViaSpf);
        assert_eq!(report.dmarc_fields.get("p"), Some("quarantine"));
        assert!(report.alignment.spf_aligned && report.alignment.dkim_aligned);
    }

    #[tokio::test]
    async fn test_unknown_domain_is_spoofed() {
        let checker = SpoofChecker::new(example_resolver());
        let report = checker
            .check("bob@nowhere.invalid", &CheckOptions::default())
            .await
            .unwrap();

        assert_eq!(report.spf, RecordLookup::NotFound);
        assert_eq!(report.dmarc, RecordLookup::NotFound);
        assert_eq!(report.summary, VerdictSummary::PossiblySpoofed);
        assert_eq!(report.classification.verdict, ClassificationVerdict::Spoofed);
        assert_eq!(report.disposition, PolicyDisposition::AllowedNone);
        assert_eq!(report.dmarc_fields, DmarcFields::default());
    }

    #[tokio::test]
    async fn test_strict_alignment_falls_back_to_policy() {
        let checker = SpoofChecker::new(example_resolver());
        let options = CheckOptions {
            dkim_status: DkimStatus::Pass,
            spf_domain: Some("bounce.strict.example".to_string()),
            dkim_domain: Some("mailer.example.net".to_string()),
            ..CheckOptions::default()
        };
        let report = checker.check("ceo@strict.example", &options).await.unwrap();

        assert!(!report.alignment.spf_aligned);
        assert!(!report.alignment.dkim_aligned);
        assert_eq!(report.disposition, PolicyDisposition::Rejected);
        // Scorer only looks at record presence, so it still reads legit
        assert_eq!(report.classification.verdict, ClassificationVerdict::Legit);
    }

    #[tokio::test]
    async fn test_failed_dmarc_lookup_is_kept_distinct() {
        let checker = SpoofChecker::new(example_resolver());
        let report = checker
            .check("ops@flaky.test", &CheckOptions::default())
            .await
            .unwrap();

        assert_eq!(report.dmarc, RecordLookup::Failed("timed out".to_string()));
        assert_eq!(report.summary, VerdictSummary::PartialSpfOnly);
        assert!(matches!(
            report.dmarc.require("_dmarc.flaky.test"),
            Err(SpoofCheckError::ResolutionFailure { .. })
        ));
    }

    #[test]
    fn test_authentication_results_feed_options() {
        let options = CheckOptions::default().with_authentication_results(
            "mx.example.net; dkim=pass header.d=mailer.example.com",
        );

        assert_eq!(options.dkim_status, DkimStatus::Pass);
        assert_eq!(options.dkim_domain, Some("mailer.example.com".to_string()));
    }

    #[test]
    fn test_evaluate_header_mismatch() {
        let report = SpoofChecker::<StaticResolver>::evaluate(
            "x@example.com",
            "example.com".to_string(),
            RecordLookup::Found("v=spf1 include:_spf.example.com ~all".to_string()),
            RecordLookup::Found("v=DMARC1; p=quarantine".to_string()),
            &CheckOptions {
                dkim_status: DkimStatus::Fail("unknown failure".to_string()),
                header_match: false,
                ..CheckOptions::default()
            },
        );

        assert_eq!(report.classification.score, -1);
        assert_eq!(report.classification.verdict, ClassificationVerdict::Spoofed);
        assert_eq!(report.disposition, PolicyDisposition::PassViaSpf);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_outcomes() {
        let checker = Arc::new(SpoofChecker::new(example_resolver()));
        let emails = vec![
            "a@example.com".to_string(),
            "broken".to_string(),
            "c@flaky.test".to_string(),
        ];

        let entries =
            SpoofChecker::check_batch(checker, emails.clone(), CheckOptions::default()).await;

        let returned: Vec<&str> = entries.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(returned, vec!["a@example.com", "broken", "c@flaky.test"]);

        assert!(matches!(&entries[0].outcome, BatchOutcome::Report(r) if r.domain == "example.com"));
        assert!(matches!(&entries[1].outcome, BatchOutcome::Error { .. }));
        assert!(
            matches!(&entries[2].outcome, BatchOutcome::Report(r) if matches!(r.dmarc, RecordLookup::Failed(_)))
        );
    }

    #[tokio::test]
    async fn test_override_domains_align_regardless_of_case() {
        let checker = SpoofChecker::new(example_resolver());
        let options = CheckOptions {
            dkim_status: DkimStatus::Pass,
            spf_domain: Some("Strict.EXAMPLE".to_string()),
            dkim_domain: Some("strict.example.".to_string()),
            ..CheckOptions::default()
        };
        let report = checker.check("ceo@Strict.Example", &options).await.unwrap();

        assert_eq!(report.domain, "strict.example");
        assert_eq!(report.spf_domain, "strict.example");
        assert_eq!(report.dkim_domain, "strict.example");
        assert!(report.alignment.spf_aligned);
        assert!(report.alignment.dkim_aligned);
        assert_eq!(report.disposition, PolicyDisposition::PassViaSpf);
    }

    #[tokio::test]
    async fn test_panicked_task_is_not_a_lookup_error() {
        let handle = tokio::spawn(async { panic!("boom") });
        let error = handle.await.unwrap_err();
        let outcome = BatchOutcome::task_failed(&error);

        match outcome {
            BatchOutcome::Error { message } => {
                assert!(message.starts_with("check task failed"));
                assert!(!message.contains("TXT lookup"));
            }
            BatchOutcome::Report(_) => panic!("expected an error outcome"),
        }
    }

    #[test]
    fn test_batch_list_skips_blanks_and_comments() {
        let content = "# senders to audit\nalice@example.com\n\n   \n  bob@example.org  \n  # trailing note\n";

        assert_eq!(
            parse_batch_list(content),
            vec!["alice@example.com".to_string(), "bob@example.org".to_string()]
        );
        assert!(parse_batch_list("").is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let report = SpoofChecker::<StaticResolver>::evaluate(
            "x@example.com",
            "example.com".to_string(),
            RecordLookup::NotFound,
            RecordLookup::Found("v=DMARC1; p=reject; pct=25".to_string()),
            &CheckOptions::default(),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["spf"]["status"], "not_found");
        assert_eq!(json["disposition"], "rejected");
        assert_eq!(json["summary"], "partial-dmarc-only");
        assert_eq!(json["classification"]["verdict"], "spoofed");
        assert_eq!(json["dmarc_fields"]["p"], "reject");
        assert_eq!(json["effective_policy"]["percentage"], 25);
        assert_eq!(json["effective_policy"]["subdomain_policy"], serde_json::Value::Null);
    }
}
