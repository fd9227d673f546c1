use crate::utils::error::{CepError, FetchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted by the postal code in endpoint templates.
pub const CEP_PLACEHOLDER: &str = "{cep}";

/// Postal code as typed by the caller. Never validated here; providers
/// reject malformed codes themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PostalCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for PostalCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address in the shape every provider is mapped into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAddress {
    /// Authority (`host[:port]`) of the provider that answered
    pub api: String,
    pub street: String,
    pub neighborhood: String,
    /// Empty when the provider has no such field
    pub complement: String,
    pub city: String,
    pub state: String,
}

/// Response schemas the adapters know how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSchema {
    BrasilApi,
    ViaCep,
}

impl ProviderSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderSchema::BrasilApi => "brasilapi",
            ProviderSchema::ViaCep => "viacep",
        }
    }
}

impl fmt::Display for ProviderSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderSchema {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brasilapi" => Ok(ProviderSchema::BrasilApi),
            "viacep" => Ok(ProviderSchema::ViaCep),
            other => Err(CepError::InvalidConfigValueError {
                field: "schema".to_string(),
                value: other.to_string(),
                reason: "Unknown provider schema. Valid schemas: brasilapi, viacep".to_string(),
            }),
        }
    }
}

/// One upstream lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// URL template containing `{cep}`
    pub endpoint: String,
    /// Overrides the host-based adapter lookup when set
    #[serde(default)]
    pub schema: Option<ProviderSchema>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: ProviderSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Substitutes the code verbatim, without escaping.
    pub fn endpoint_for(&self, cep: &PostalCode) -> String {
        self.endpoint.replace(CEP_PLACEHOLDER, cep.as_str())
    }

    pub fn brasil_api() -> Self {
        Self::new("brasilapi", "https://brasilapi.com.br/api/cep/v1/{cep}")
    }

    pub fn via_cep() -> Self {
        Self::new("viacep", "http://viacep.com.br/ws/{cep}/json/")
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::brasil_api(), Self::via_cep()]
    }
}

/// How the resolver picks the winner among concurrent fetchers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RacePolicy {
    /// Failures are collected; only a success ends the race early.
    #[default]
    FirstSuccess,
    /// Whatever arrives first, success or failure, is final.
    FirstOutcome,
}

impl FromStr for RacePolicy {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-success" | "first_success" => Ok(RacePolicy::FirstSuccess),
            "first-outcome" | "first_outcome" => Ok(RacePolicy::FirstOutcome),
            other => Err(CepError::InvalidConfigValueError {
                field: "policy".to_string(),
                value: other.to_string(),
                reason: "Valid policies: first-success, first-outcome".to_string(),
            }),
        }
    }
}

/// The single result of one fetcher invocation.
pub type FetchOutcome = std::result::Result<NormalizedAddress, FetchError>;
