use crate::checker::{BatchEntry, BatchOutcome, SpoofReport};
use crate::classifier::ClassificationVerdict;
use crate::dns::RecordKind;
use std::fmt::Write;

fn yes_no(value: bool) -> &'static str {
    if value {
        "✅ Yes"
    } else {
        "❌ No"
    }
}

/// The three lines printed by the interactive checker
pub fn render_summary(report: &SpoofReport) -> String {
    format!(
        "SPF: {}\nDMARC: {}\nVerdict: {} {}\n",
        report.spf.describe(RecordKind::Spf),
        report.dmarc.describe(RecordKind::Dmarc),
        report.summary.icon(),
        report.summary
    )
}

/// Full human-readable report
pub fn render_text(report: &SpoofReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📧 Sender: {}", report.email);
    let _ = writeln!(out, "   Domain: {}", report.domain);
    let _ = writeln!(out);
    out.push_str(&render_summary(report));
    let _ = writeln!(out);

    let _ = writeln!(out, "📜 Parsed DMARC Policy:");
    for (key, value) in report.dmarc_fields.iter() {
        let _ = writeln!(out, "  - {key}: {value}");
    }
    let effective = &report.effective_policy;
    let subdomain = effective
        .subdomain_policy
        .map_or_else(|| "same as p".to_string(), |policy| policy.to_string());
    let _ = writeln!(
        out,
        "  Effective: {} for {}% of failing mail, subdomains {}, reports to {}",
        effective.policy, effective.percentage, subdomain, effective.report_uri
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "🔧 Alignment Check Results:");
    let _ = writeln!(
        out,
        "  - SPF Alignment ({}, {}): {}",
        report.dmarc_fields.spf_mode(),
        report.spf_domain,
        yes_no(report.alignment.spf_aligned)
    );
    let _ = writeln!(
        out,
        "  - DKIM Alignment ({}, {}): {}",
        report.dmarc_fields.dkim_mode(),
        report.dkim_domain,
        yes_no(report.alignment.dkim_aligned)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "📢 DMARC Policy Verdict:");
    let _ = writeln!(
        out,
        "  {} ({})",
        report.disposition,
        report.disposition.description()
    );
    let _ = writeln!(out);

    let icon = match report.classification.verdict {
        ClassificationVerdict::Legit => "✅",
        ClassificationVerdict::Suspicious => "⚠️",
        ClassificationVerdict::Spoofed => "🚨",
    };
    let _ = writeln!(
        out,
        "{icon} Classification: {} (score {})",
        report.classification.verdict, report.classification.score
    );
    for evidence in &report.classification.evidence {
        let _ = writeln!(out, "  - {evidence}");
    }

    out
}

pub fn render_batch_text(entries: &[BatchEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out, "═══════════════════════════════════════");
        }
        match &entry.outcome {
            BatchOutcome::Report(report) => out.push_str(&render_text(report)),
            BatchOutcome::Error { message } => {
                let _ = writeln!(out, "❌ {}: {message}", entry.email);
            }
        }
    }
    out
}
