use crate::app::presenter::OutputFormat;
use crate::config::toml_config::DEFAULT_TIMEOUT_MS;
use crate::core::ConfigProvider;
use crate::domain::model::{ProviderConfig, RacePolicy};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "cep-race")]
#[command(about = "Resolve a Brazilian postal code (CEP) by racing several lookup services")]
pub struct CliConfig {
    /// Postal code to look up; prompts on stdin when omitted
    pub cep: Option<String>,

    /// Overall time budget for the lookup, in milliseconds [default: 1000]
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// first-success (failures never end the race early) or first-outcome
    #[arg(long)]
    pub policy: Option<RacePolicy>,

    /// TOML file with providers, host mappings and resolver settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON on stderr")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn providers(&self) -> Vec<ProviderConfig> {
        ProviderConfig::defaults()
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    fn race_policy(&self) -> RacePolicy {
        self.policy.unwrap_or_default()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(timeout_ms) = self.timeout_ms {
            validate_positive_number("--timeout-ms", timeout_ms, 1)?;
        }
        Ok(())
    }
}
