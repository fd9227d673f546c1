pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use crate::core::resolver::Resolver;
pub use domain::model::{NormalizedAddress, PostalCode, ProviderConfig, ProviderSchema, RacePolicy};
pub use domain::ports::AddressLookup;
pub use utils::error::{CepError, ErrorKind, FetchError, Result};
