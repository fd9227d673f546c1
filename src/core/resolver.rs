use crate::adapters::AdapterRegistry;
use crate::core::fetcher::Fetcher;
use crate::core::scope::CancellationScope;
use crate::domain::model::{NormalizedAddress, PostalCode, ProviderConfig, RacePolicy};
use crate::domain::ports::{AddressLookup, ConfigProvider};
use crate::utils::error::{CepError, FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Races one fetcher per provider against a shared deadline.
pub struct Resolver {
    providers: Arc<[ProviderConfig]>,
    client: Client,
    registry: Arc<AdapterRegistry>,
    timeout: Duration,
    policy: RacePolicy,
}

impl Resolver {
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers: providers.into(),
            client: Client::new(),
            registry: Arc::new(AdapterRegistry::default()),
            timeout: DEFAULT_TIMEOUT,
            policy: RacePolicy::default(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        let mut registry = AdapterRegistry::default().with_fallback(config.fallback_schema());
        for (host, schema) in config.host_mappings() {
            registry.register(host, schema);
        }

        Self::new(config.providers())
            .with_timeout(config.timeout())
            .with_policy(config.race_policy())
            .with_registry(registry)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    /// Returns the winning address, or why no provider won in time.
    ///
    /// Every fetcher sends exactly once into a channel sized for all of
    /// them, so late fetchers never block after this returns. The shared
    /// scope is cancelled on every return path; spawned tasks are not
    /// awaited.
    pub async fn resolve(&self, cep: &PostalCode) -> Result<NormalizedAddress> {
        if self.providers.is_empty() {
            return Err(CepError::NoProviders);
        }

        self.race(cep, &CancellationScope::with_timeout(self.timeout)).await
    }

    /// Fetchers run on children of `scope`, which is cancelled when the race
    /// is decided.
    async fn race(&self, cep: &PostalCode, scope: &CancellationScope) -> Result<NormalizedAddress> {
        let _cancel_on_return = scope.drop_guard();
        let (tx, mut rx) = mpsc::channel(self.providers.len());

        tracing::debug!(
            "Resolving {} across {} providers (timeout {:?}, {:?})",
            cep,
            self.providers.len(),
            self.timeout,
            self.policy
        );

        let fetcher = Fetcher::new(self.client.clone(), Arc::clone(&self.registry));
        for index in 0..self.providers.len() {
            let providers = Arc::clone(&self.providers);
            let fetcher = fetcher.clone();
            let cep = cep.clone();
            let scope = scope.child();
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = fetcher.fetch(&providers[index], &cep, &scope).await;
                // the receiver is gone once the race is decided
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let deadline = tokio::time::sleep_until(scope.deadline());
        tokio::pin!(deadline);

        let mut failures = Vec::new();
        loop {
            tokio::select! {
                // a deadline that has passed beats anything still queued
                biased;
                _ = &mut deadline => {
                    tracing::warn!("⏱️ Lookup of {} timed out after {:?}", cep, self.timeout);
                    return Err(CepError::Timeout(self.timeout));
                }
                received = rx.recv() => match received {
                    Some(Ok(address)) => {
                        tracing::info!("✅ {} resolved by {}", cep, address.api);
                        return Ok(address);
                    }
                    Some(Err(failure)) => {
                        tracing::warn!("Provider failed for {}: {}", cep, failure);
                        if self.policy == RacePolicy::FirstOutcome {
                            return Err(CepError::Provider(failure));
                        }
                        failures.push(failure);
                    }
                    None => return Err(aggregate(failures)),
                },
            }
        }
    }
}

/// A lone failure is surfaced as itself rather than as an aggregate.
fn aggregate(mut failures: Vec<FetchError>) -> CepError {
    if failures.len() == 1 {
        if let Some(only) = failures.pop() {
            return CepError::Provider(only);
        }
    }
    CepError::AllProvidersFailed(failures)
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ProviderConfig::defaults())
    }
}

#[async_trait]
impl AddressLookup for Resolver {
    async fn lookup(&self, cep: &PostalCode) -> Result<NormalizedAddress> {
        self.resolve(cep).await
    }
}
