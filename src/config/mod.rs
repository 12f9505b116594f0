use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DnsConfig {
    /// Upper bound for one TXT lookup, connect and total lifetime alike
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_use_system_conf")]
    pub use_system_conf: bool,
    /// `ip:port` entries, used when the system configuration is off or unreadable
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<String>,
}

fn default_timeout_seconds() -> u64 {
    3
}

fn default_nameservers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()]
}

fn default_use_system_conf() -> bool {
    true
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            use_system_conf: default_use_system_conf(),
            nameservers: default_nameservers(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns: DnsConfig::default(),
            output: OutputConfig::default(),
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        self.logging
            .as_ref()
            .and_then(|logging| logging.level.parse().ok())
    }
}
