use crate::adapters::{authority, AdapterRegistry, Normalize};
use crate::core::scope::CancellationScope;
use crate::domain::model::{FetchOutcome, PostalCode, ProviderConfig};
use crate::utils::error::{ErrorKind, FetchError};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Performs one GET against one provider and normalizes the answer.
///
/// Every failure path returns immediately, so a call yields exactly one
/// outcome.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    registry: Arc<AdapterRegistry>,
}

impl Fetcher {
    pub fn new(client: Client, registry: Arc<AdapterRegistry>) -> Self {
        Self { client, registry }
    }

    pub async fn fetch(
        &self,
        provider: &ProviderConfig,
        cep: &PostalCode,
        scope: &CancellationScope,
    ) -> FetchOutcome {
        let endpoint = provider.endpoint_for(cep);
        let fail = |kind: ErrorKind, message: String| {
            tracing::debug!("Provider {} failed ({}): {}", provider.name, kind, message);
            Err(FetchError::new(provider.name.clone(), kind, message))
        };

        let url = match Url::parse(&endpoint) {
            Ok(url) => url,
            Err(e) => return fail(ErrorKind::InvalidUrl, format!("{}: {}", endpoint, e)),
        };

        let resolved = match provider.schema {
            Some(schema) => Ok(schema),
            None => self.registry.resolve(&url),
        };
        let schema = match resolved {
            Ok(schema) => schema,
            Err(kind) => {
                return fail(
                    kind,
                    format!("no adapter registered for host '{}'", authority(&url)),
                )
            }
        };

        tracing::debug!("Making API request to: {} ({} schema)", url, schema);

        let response = match scope.run(self.client.get(url.clone()).send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return fail(ErrorKind::Timeout, e.to_string()),
            Ok(Err(e)) => return fail(ErrorKind::NetworkError, e.to_string()),
            Err(interrupted) => return fail(interrupted.kind(), interrupted.to_string()),
        };

        let status = response.status();
        tracing::debug!("API response status from {}: {}", provider.name, status);
        if !status.is_success() {
            return fail(ErrorKind::UpstreamStatus, format!("HTTP {}", status));
        }

        let body = match scope.run(response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) if e.is_timeout() => return fail(ErrorKind::Timeout, e.to_string()),
            Ok(Err(e)) => return fail(ErrorKind::BodyReadError, e.to_string()),
            Err(interrupted) => return fail(interrupted.kind(), interrupted.to_string()),
        };

        match schema.decode(&body) {
            Ok(record) => Ok(record.normalize(&authority(&url))),
            Err(e) => fail(e.kind(), e.to_string()),
        }
    }
}
