use crate::config::DnsConfig;
use crate::domain_utils::DomainUtils;
use crate::error::{Result, SpoofCheckError};
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Raw answer to a TXT query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxtAnswer {
    /// Decoded text of every TXT record in the answer
    Records(Vec<String>),
    /// The name exists without TXT data, or does not exist at all
    NoRecords,
    /// Timeout, SERVFAIL, network error or malformed response
    Failed(String),
}

/// Source of TXT records.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    async fn txt_records(&self, name: &str) -> TxtAnswer;
}

/// The two policy records a sender domain can publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Spf,
    Dmarc,
}

impl RecordKind {
    pub fn version_tag(&self) -> &'static str {
        match self {
            RecordKind::Spf => "v=spf1",
            RecordKind::Dmarc => "v=DMARC1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Spf => "SPF",
            RecordKind::Dmarc => "DMARC",
        }
    }

    pub fn query_name(&self, domain: &str) -> String {
        match self {
            RecordKind::Spf => domain.to_string(),
            RecordKind::Dmarc => DomainUtils::dmarc_query_name(domain),
        }
    }
}

/// Outcome of looking up one policy record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RecordLookup {
    Found(String),
    NotFound,
    Failed(String),
}

impl RecordLookup {
    /// Pick the first record starting with the kind's version tag
    pub fn from_answer(answer: TxtAnswer, kind: RecordKind) -> Self {
        match answer {
            TxtAnswer::Records(records) => records
                .into_iter()
                .find(|record| record.starts_with(kind.version_tag()))
                .map(RecordLookup::Found)
                .unwrap_or(RecordLookup::NotFound),
            TxtAnswer::NoRecords => RecordLookup::NotFound,
            TxtAnswer::Failed(reason) => RecordLookup::Failed(reason),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            RecordLookup::Found(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// True when a record was found and carries `tag` anywhere in its text
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.text().is_some_and(|text| text.contains(tag))
    }

    /// Convert into the record text or a typed error naming `name`
    pub fn require(&self, name: &str) -> Result<&str> {
        match self {
            RecordLookup::Found(text) => Ok(text.as_str()),
            RecordLookup::NotFound => Err(SpoofCheckError::RecordNotFound {
                name: name.to_string(),
            }),
            RecordLookup::Failed(reason) => Err(SpoofCheckError::ResolutionFailure {
                name: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    /// One-line description used by the text report
    pub fn describe(&self, kind: RecordKind) -> String {
        match self {
            RecordLookup::Found(text) => text.clone(),
            RecordLookup::NotFound => format!("No {} found", kind.label()),
            RecordLookup::Failed(reason) => {
                format!("Error retrieving {} ({})", kind.label(), reason)
            }
        }
    }
}

impl fmt::Display for RecordLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLookup::Found(text) => write!(f, "{text}"),
            RecordLookup::NotFound => write!(f, "not found"),
            RecordLookup::Failed(reason) => write!(f, "lookup failed: {reason}"),
        }
    }
}

/// TXT resolver backed by hickory.
///
/// Every query is bounded by `timeout`, tried once and never cached.
pub struct HickoryTxtResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl HickoryTxtResolver {
    pub fn from_config(config: &DnsConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.max(1));

        let (resolver_config, mut opts) = if config.use_system_conf {
            match hickory_resolver::system_conf::read_system_conf() {
                Ok(system) => system,
                Err(e) => {
                    log::warn!("Failed to read system DNS configuration, using configured nameservers: {e}");
                    (Self::nameserver_config(&config.nameservers)?, ResolverOpts::default())
                }
            }
        } else {
            (Self::nameserver_config(&config.nameservers)?, ResolverOpts::default())
        };

        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        log::debug!(
            "DNS resolver ready (timeout: {}s, system conf: {})",
            timeout.as_secs(),
            config.use_system_conf
        );

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
            timeout,
        })
    }

    fn nameserver_config(nameservers: &[String]) -> anyhow::Result<ResolverConfig> {
        if nameservers.is_empty() {
            return Ok(ResolverConfig::default());
        }

        let mut group = NameServerConfigGroup::new();
        for entry in nameservers {
            let addr: SocketAddr = entry
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid nameserver address '{entry}': {e}"))?;
            group.merge(NameServerConfigGroup::from_ips_clear(
                &[addr.ip()],
                addr.port(),
                true,
            ));
        }

        Ok(ResolverConfig::from_parts(None, vec![], group))
    }

    fn classify_error(name: &str, error: &ResolveError) -> TxtAnswer {
        match error.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => {
                log::debug!("No TXT records at {name}");
                TxtAnswer::NoRecords
            }
            ResolveErrorKind::Timeout => {
                log::warn!("TXT lookup for {name} timed out");
                TxtAnswer::Failed("timed out".to_string())
            }
            _ => {
                log::warn!("TXT lookup for {name} failed: {error}");
                TxtAnswer::Failed(error.to_string())
            }
        }
    }
}

#[async_trait]
impl TxtResolver for HickoryTxtResolver {
    async fn txt_records(&self, name: &str) -> TxtAnswer {
        let lookup_future = self.resolver.txt_lookup(name);

        match tokio::time::timeout(self.timeout, lookup_future).await {
            Ok(Ok(response)) => {
                // A record may be split into several character-strings
                let records: Vec<String> = response
                    .iter()
                    .map(|txt| {
                        txt.txt_data()
                            .iter()
                            .map(|chunk| String::from_utf8_lossy(chunk))
                            .collect::<String>()
                    })
                    .collect();
                log::debug!("Found {} TXT record(s) at {name}", records.len());
                if records.is_empty() {
                    TxtAnswer::NoRecords
                } else {
                    TxtAnswer::Records(records)
                }
            }
            Ok(Err(e)) => Self::classify_error(name, &e),
            Err(_) => {
                log::warn!(
                    "TXT lookup for {name} exceeded {}s",
                    self.timeout.as_secs()
                );
                TxtAnswer::Failed("timed out".to_string())
            }
        }
    }
}

/// In-memory resolver for tests and offline use.
///
/// Names without an entry answer `NoRecords`.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    answers: HashMap<String, TxtAnswer>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, name: &str, records: &[&str]) -> Self {
        self.answers.insert(
            name.to_lowercase(),
            TxtAnswer::Records(records.iter().map(|r| r.to_string()).collect()),
        );
        self
    }

    pub fn with_failure(mut self, name: &str, reason: &str) -> Self {
        self.answers
            .insert(name.to_lowercase(), TxtAnswer::Failed(reason.to_string()));
        self
    }
}

#[async_trait]
impl TxtResolver for StaticResolver {
    async fn txt_records(&self, name: &str) -> TxtAnswer {
        self.answers
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or(TxtAnswer::NoRecords)
    }
}

/// Fetches the SPF and DMARC records of a sender domain
pub struct RecordFetcher<R> {
    resolver: R,
}

impl<R: TxtResolver> RecordFetcher<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub async fn fetch(&self, domain: &str, kind: RecordKind) -> RecordLookup {
        let name = kind.query_name(domain);
        let answer = self.resolver.txt_records(&name).await;
        let lookup = RecordLookup::from_answer(answer, kind);
        log::debug!("{} lookup for {name}: {lookup}", kind.label());
        lookup
    }

    pub async fn fetch_spf(&self, domain: &str) -> RecordLookup {
        self.fetch(domain, RecordKind::Spf).await
    }

    pub async fn fetch_dmarc(&self, domain: &str) -> RecordLookup {
        self.fetch(domain, RecordKind::Dmarc).await
    }
}
