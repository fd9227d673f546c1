use crate::core::ConfigProvider;
use crate::domain::model::{ProviderConfig, ProviderSchema, RacePolicy};
use crate::utils::error::{CepError, Result};
use crate::utils::validation::{
    validate_endpoint_template, validate_non_empty_string, validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub resolver: ResolverSection,
    /// Extra `host[:port]` -> schema entries for the adapter registry
    #[serde(default)]
    pub hosts: HashMap<String, ProviderSchema>,
    /// Falls back to the built-in BrasilAPI + ViaCEP pair when absent
    pub providers: Option<Vec<ProviderConfig>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverSection {
    pub timeout_ms: Option<u64>,
    pub policy: Option<RacePolicy>,
    /// Schema for unmatched hosts; unset means they fail as unknown
    pub fallback_schema: Option<ProviderSchema>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CepError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CepError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VIACEP_HOST})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// CLI flags win over file values.
    pub fn apply_overrides(&mut self, timeout_ms: Option<u64>, policy: Option<RacePolicy>) {
        if let Some(timeout_ms) = timeout_ms {
            tracing::debug!("🔧 timeout overridden to {}ms", timeout_ms);
            self.resolver.timeout_ms = Some(timeout_ms);
        }
        if let Some(policy) = policy {
            tracing::debug!("🔧 race policy overridden to {:?}", policy);
            self.resolver.policy = Some(policy);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_number("resolver.timeout_ms", self.timeout_ms(), 1)?;

        let providers = self.providers();
        if providers.is_empty() {
            return Err(CepError::NoProviders);
        }

        for (index, provider) in providers.iter().enumerate() {
            validate_non_empty_string(&format!("providers[{}].name", index), &provider.name)?;
            validate_endpoint_template(&format!("providers[{}].endpoint", index), &provider.endpoint)?;
        }

        for host in self.hosts.keys() {
            validate_non_empty_string("hosts", host)?;
        }

        Ok(())
    }

    pub fn timeout_ms(&self) -> u64 {
        self.resolver.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

impl ConfigProvider for TomlConfig {
    fn providers(&self) -> Vec<ProviderConfig> {
        self.providers.clone().unwrap_or_else(ProviderConfig::defaults)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    fn race_policy(&self) -> RacePolicy {
        self.resolver.policy.unwrap_or_default()
    }

    fn fallback_schema(&self) -> Option<ProviderSchema> {
        self.resolver.fallback_schema
    }

    fn host_mappings(&self) -> HashMap<String, ProviderSchema> {
        self.hosts.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[resolver]
timeout_ms = 250
policy = "first-outcome"
fallback_schema = "viacep"

[hosts]
"cep.internal:8080" = "brasilapi"

[[providers]]
name = "internal"
endpoint = "http://cep.internal:8080/api/cep/v1/{cep}"

[[providers]]
name = "viacep"
endpoint = "http://viacep.com.br/ws/{cep}/json/"
schema = "viacep"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.race_policy(), RacePolicy::FirstOutcome);
        assert_eq!(config.fallback_schema(), Some(ProviderSchema::ViaCep));
        assert_eq!(
            config.host_mappings().get("cep.internal:8080"),
            Some(&ProviderSchema::BrasilApi)
        );

        let providers = config.providers();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].schema, None);
        assert_eq!(providers[1].schema, Some(ProviderSchema::ViaCep));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.race_policy(), RacePolicy::FirstSuccess);
        assert_eq!(config.fallback_schema(), None);
        assert_eq!(config.providers(), ProviderConfig::defaults());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CEP_RACE_TEST_HOST", "cep.example.org");

        let toml_content = r#"
[[providers]]
name = "mirror"
endpoint = "https://${CEP_RACE_TEST_HOST}/ws/{cep}/json/"
schema = "viacep"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.providers()[0].endpoint,
            "https://cep.example.org/ws/{cep}/json/"
        );

        std::env::remove_var("CEP_RACE_TEST_HOST");
    }

    #[test]
    fn test_config_validation() {
        let missing_placeholder = TomlConfig::from_toml_str(
            r#"
[[providers]]
name = "viacep"
endpoint = "http://viacep.com.br/ws/01001000/json/"
"#,
        )
        .unwrap();
        assert!(missing_placeholder.validate().is_err());

        let zero_timeout = TomlConfig::from_toml_str("[resolver]\ntimeout_ms = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());

        let no_providers = TomlConfig::from_toml_str("providers = []\n").unwrap();
        assert!(matches!(no_providers.validate(), Err(CepError::NoProviders)));
    }

    #[test]
    fn test_unknown_schema_is_a_parse_error() {
        let result = TomlConfig::from_toml_str(
            r#"
[[providers]]
name = "correios"
endpoint = "https://correios.example/{cep}"
schema = "correios"
"#,
        );
        assert!(matches!(result, Err(CepError::ConfigError { .. })));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = TomlConfig::from_toml_str("[resolver]\ntimeout_ms = 5000\n").unwrap();
        config.apply_overrides(Some(300), Some(RacePolicy::FirstOutcome));

        assert_eq!(config.timeout(), Duration::from_millis(300));
        assert_eq!(config.race_policy(), RacePolicy::FirstOutcome);

        config.apply_overrides(None, None);
        assert_eq!(config.timeout(), Duration::from_millis(300));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[resolver]
timeout_ms = 1500
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.timeout_ms(), 1500);
    }
}
