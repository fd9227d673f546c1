pub mod fetcher;
pub mod resolver;
pub mod scope;

pub use crate::domain::model::{FetchOutcome, NormalizedAddress, PostalCode, ProviderConfig};
pub use crate::domain::ports::{AddressLookup, ConfigProvider};
pub use crate::utils::error::Result;
