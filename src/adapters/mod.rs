// Adapters layer: one module per upstream schema plus the host -> schema
// registry the fetcher consults.

pub mod brasil_api;
pub mod via_cep;

use crate::domain::model::{NormalizedAddress, ProviderSchema};
use crate::utils::error::ErrorKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

pub use brasil_api::BrasilApiRecord;
pub use via_cep::ViaCepRecord;

/// Pure field mapping from a provider record into the unified shape.
pub trait Normalize {
    fn normalize(self, api: &str) -> NormalizedAddress;
}

/// A decoded body, tagged with the schema it was decoded against.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    BrasilApi(BrasilApiRecord),
    ViaCep(ViaCepRecord),
}

impl Normalize for ProviderResponse {
    fn normalize(self, api: &str) -> NormalizedAddress {
        match self {
            ProviderResponse::BrasilApi(record) => record.normalize(api),
            ProviderResponse::ViaCep(record) => record.normalize(api),
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("postal code not found")]
    NotFound,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Malformed(_) | DecodeError::NotAnObject(_) => ErrorKind::ParseError,
            DecodeError::NotFound => ErrorKind::NotFound,
        }
    }
}

impl ProviderSchema {
    pub fn decode(&self, body: &[u8]) -> Result<ProviderResponse, DecodeError> {
        match self {
            ProviderSchema::BrasilApi => Ok(ProviderResponse::BrasilApi(decode_object(body)?)),
            ProviderSchema::ViaCep => {
                let record: ViaCepRecord = decode_object(body)?;
                if record.is_not_found() {
                    return Err(DecodeError::NotFound);
                }
                Ok(ProviderResponse::ViaCep(record))
            }
        }
    }
}

/// Records default every field, so only an object may fill them; derived
/// `Deserialize` would otherwise also accept a positional array.
fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let found = match &value {
        serde_json::Value::Object(_) => return Ok(serde_json::from_value(value)?),
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Null => "null",
    };
    Err(DecodeError::NotAnObject(found))
}

/// `null` decodes like a missing field.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `host[:port]` of a URL, the value reported as the answering API.
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Explicit mapping from upstream host to response schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRegistry {
    hosts: HashMap<String, ProviderSchema>,
    fallback: Option<ProviderSchema>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            hosts: HashMap::new(),
            fallback: None,
        }
    }

    /// Registers `host` (optionally `host:port`), replacing any previous entry.
    pub fn register(&mut self, host: impl Into<String>, schema: ProviderSchema) -> &mut Self {
        self.hosts.insert(host.into().to_ascii_lowercase(), schema);
        self
    }

    /// Treat unmatched hosts as `schema` instead of failing them.
    pub fn with_fallback(mut self, schema: Option<ProviderSchema>) -> Self {
        self.fallback = schema;
        self
    }

    /// Most specific match wins: `host:port`, then bare host, then fallback.
    pub fn resolve(&self, url: &Url) -> Result<ProviderSchema, ErrorKind> {
        let host = url.host_str().map(str::to_ascii_lowercase);
        let with_port = host
            .as_ref()
            .zip(url.port())
            .map(|(h, p)| format!("{}:{}", h, p));

        with_port
            .and_then(|key| self.hosts.get(&key))
            .or_else(|| host.and_then(|h| self.hosts.get(&h)))
            .copied()
            .or(self.fallback)
            .ok_or(ErrorKind::UnknownProvider)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("brasilapi.com.br", ProviderSchema::BrasilApi)
            .register("viacep.com.br", ProviderSchema::ViaCep);
        registry
    }
}
