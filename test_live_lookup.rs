#![allow(clippy::uninlined_format_args)]

use spoof_check::config::Config;
use spoof_check::report::render_summary;
use spoof_check::{CheckOptions, DkimStatus, HickoryTxtResolver, SpoofChecker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing live SPF/DMARC lookups...");

    let config = Config::default();
    let resolver = HickoryTxtResolver::from_config(&config.dns)?;
    let checker = SpoofChecker::new(resolver);

    let options = CheckOptions {
        dkim_status: DkimStatus::Pass,
        ..CheckOptions::default()
    };

    // Test case 1: large provider, both records published
    println!("\n=== Test Case 1: gmail.com ===");
    let report = checker.check("someone@gmail.com", &options).await?;
    print!("{}", render_summary(&report));
    println!("Disposition: {}", report.disposition);
    println!(
        "Classification: {} (score {})",
        report.classification.verdict, report.classification.score
    );

    // Test case 2: reserved name, nothing should resolve
    println!("\n=== Test Case 2: example.invalid ===");
    let report = checker.check("nobody@example.invalid", &options).await?;
    print!("{}", render_summary(&report));
    println!("SPF lookup: {:?}", report.spf);
    println!("DMARC lookup: {:?}", report.dmarc);

    // Test case 3: malformed input
    println!("\n=== Test Case 3: malformed address ===");
    match checker.check("not an email", &options).await {
        Ok(report) => println!("Unexpected report for {}", report.domain),
        Err(e) => println!("Error: {}", e),
    }

    println!("\n=== Live Lookup Testing Complete ===");
    Ok(())
}
