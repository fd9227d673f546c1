use crate::domain::model::{NormalizedAddress, PostalCode, ProviderConfig, ProviderSchema, RacePolicy};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Anything that can turn a postal code into an address.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, cep: &PostalCode) -> Result<NormalizedAddress>;
}

pub trait ConfigProvider: Send + Sync {
    fn providers(&self) -> Vec<ProviderConfig>;
    fn timeout(&self) -> Duration;
    fn race_policy(&self) -> RacePolicy;

    /// Schema used for hosts missing from the registry. `None` makes an
    /// unmatched host a failure.
    fn fallback_schema(&self) -> Option<ProviderSchema> {
        None
    }

    /// Extra `host[:port] -> schema` entries on top of the built-in ones.
    fn host_mappings(&self) -> HashMap<String, ProviderSchema> {
        HashMap::new()
    }
}
