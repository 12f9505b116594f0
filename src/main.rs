use clap::{Arg, Command};
use log::LevelFilter;
use spoof_check::config::OutputFormat;
use spoof_check::checker::parse_batch_list;
use spoof_check::report::{render_batch_text, render_text};
use spoof_check::{
    CheckOptions, Config, DkimStatus, HickoryTxtResolver, SpoofCheckError, SpoofChecker,
};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("spoof-check")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check a sender domain's SPF and DMARC records for spoofing risk")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("spoof-check.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("ADDRESS")
                .help("Sender address to check (repeat for a batch)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("File with one sender address per line")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("dkim-status")
                .long("dkim-status")
                .value_name("STATUS")
                .help("DKIM result from your verifier (pass, fail, none, temperror, permerror)")
                .default_value("none"),
        )
        .arg(
            Arg::new("auth-results")
                .long("auth-results")
                .value_name("HEADER")
                .help("Authentication-Results header value to take DKIM status and domain from")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("spf-domain")
                .long("spf-domain")
                .value_name("DOMAIN")
                .help("SPF-validated (MAIL FROM) domain, defaults to the sender domain")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("dkim-domain")
                .long("dkim-domain")
                .value_name("DOMAIN")
                .help("DKIM signing domain (d=), defaults to the sender domain")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("header-mismatch")
                .long("header-mismatch")
                .help("The visible From header did not match the envelope sender")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("DNS lookup timeout, overrides the configuration")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("spoof-check.yaml");

    // The log level may come from the file, so report a missing one after init
    let config_exists = std::path::Path::new(config_path).exists();
    let mut config = if config_exists {
        match Config::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.log_level().unwrap_or(LevelFilter::Info)
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if !config_exists {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.dns.timeout_seconds = *timeout;
    }
    if matches.get_flag("json") {
        config.output.format = OutputFormat::Json;
    }

    let mut options = CheckOptions {
        dkim_status: DkimStatus::parse(
            matches
                .get_one::<String>("dkim-status")
                .map(String::as_str)
                .unwrap_or("none"),
        ),
        header_match: !matches.get_flag("header-mismatch"),
        spf_domain: matches.get_one::<String>("spf-domain").cloned(),
        dkim_domain: matches.get_one::<String>("dkim-domain").cloned(),
    };
    if let Some(auth_results) = matches.get_one::<String>("auth-results") {
        options = options.with_authentication_results(auth_results);
    }

    let resolver = match HickoryTxtResolver::from_config(&config.dns) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("❌ Failed to set up DNS resolver: {e}");
            process::exit(1);
        }
    };
    let checker = SpoofChecker::new(resolver);

    let mut emails: Vec<String> = matches
        .get_many::<String>("email")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Some(batch_file) = matches.get_one::<String>("batch") {
        match read_batch_file(batch_file) {
            Ok(mut listed) => emails.append(&mut listed),
            Err(e) => {
                eprintln!("❌ Error reading batch file: {e}");
                process::exit(1);
            }
        }
    }

    match emails.len() {
        0 => run_interactive(&checker, &options, config.output.format).await,
        1 => run_single(&checker, &emails[0], &options, config.output.format).await,
        _ => {
            let entries = SpoofChecker::check_batch(Arc::new(checker), emails, options).await;
            match config.output.format {
                OutputFormat::Json => print_json(&entries),
                OutputFormat::Text => print!("{}", render_batch_text(&entries)),
            }
        }
    }
}

async fn run_interactive(
    checker: &SpoofChecker<HickoryTxtResolver>,
    options: &CheckOptions,
    format: OutputFormat,
) {
    print!("Enter sender email: ");
    if let Err(e) = io::stdout().flush() {
        log::warn!("Failed to flush prompt: {e}");
    }

    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        eprintln!("❌ Error reading input: {e}");
        process::exit(1);
    }

    run_single(checker, line.trim(), options, format).await;
}

async fn run_single(
    checker: &SpoofChecker<HickoryTxtResolver>,
    email: &str,
    options: &CheckOptions,
    format: OutputFormat,
) {
    match checker.check(email, options).await {
        Ok(report) => match format {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => print!("{}", render_text(&report)),
        },
        Err(SpoofCheckError::InvalidEmailFormat(_)) => println!("Invalid email format"),
        Err(e) => println!("❌ {e}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize report: {e}");
            process::exit(1);
        }
    }
}

fn read_batch_file(path: &str) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_batch_list(&content))
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}
