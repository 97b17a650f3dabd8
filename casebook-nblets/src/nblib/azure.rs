//! Cloud resource detail lookups through the Azure data provider seam.

use serde_json::Value;
use tracing::debug;

use casebook_core::cache::SessionCache;
use casebook_core::error::ProviderError;
use casebook_core::providers::AzureDataProvider;
use casebook_core::types::HostEntity;

/// Subscription and resource detail fetched from the management API.
#[derive(Debug, Clone, PartialEq)]
pub struct AzureApiDetails {
    pub subscription_details: Value,
    pub resource_details: Value,
}

/// Cache for resource API lookups, keyed by resource id.
pub type AzureApiCache = SessionCache<String, AzureApiDetails>;

/// Fetch subscription and resource details for an Azure host.
///
/// Returns `None` when the host carries no Azure linkage or the API call
/// fails; API failures are logged at debug and never fail the run.
pub fn azure_api_details(
    provider: &dyn AzureDataProvider,
    cache: &mut AzureApiCache,
    host: &HostEntity,
) -> Option<AzureApiDetails> {
    let azure = host.azure.as_ref()?;
    let subscription_id = azure.subscription_id.as_deref()?;
    let resource_id = azure.resource_id.as_deref()?;

    let fetched = cache.get_or_try_insert_with(resource_id.to_string(), || {
        let subscription_details = provider.subscription_info(subscription_id)?;
        let resource_details = provider.resource_details(subscription_id, resource_id)?;
        Ok::<_, ProviderError>(AzureApiDetails {
            subscription_details,
            resource_details,
        })
    });
    match fetched {
        Ok(details) => Some(details),
        Err(err) => {
            debug!(host = %host.host_name, error = %err, "Azure resource API lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_core::types::AzureHostData;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockAzureProvider {
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockAzureProvider {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AzureDataProvider for MockAzureProvider {
        fn subscription_info(&self, subscription_id: &str) -> Result<Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Unavailable {
                    name: "azure_data".into(),
                    message: "throttled".into(),
                });
            }
            Ok(json!({ "subscription_id": subscription_id, "name": "Prod" }))
        }

        fn resource_details(
            &self,
            _subscription_id: &str,
            resource_id: &str,
        ) -> Result<Value, ProviderError> {
            Ok(json!({ "id": resource_id, "location": "westus2" }))
        }
    }

    fn azure_host() -> HostEntity {
        let mut host = HostEntity::new("victim00");
        host.environment = Some("Azure".into());
        host.azure = Some(AzureHostData {
            subscription_id: Some("sub-0001".into()),
            resource_id: Some("/subscriptions/sub-0001/vm/victim00".into()),
            ..AzureHostData::default()
        });
        host
    }

    #[test]
    fn test_details_fetched_and_cached() {
        let provider = MockAzureProvider::new(false);
        let mut cache = AzureApiCache::new();
        let host = azure_host();

        let first = azure_api_details(&provider, &mut cache, &host).unwrap();
        let second = azure_api_details(&provider, &mut cache, &host).unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.subscription_details["name"], json!("Prod"));
    }

    #[test]
    fn test_api_failure_yields_none() {
        let provider = MockAzureProvider::new(true);
        let mut cache = AzureApiCache::new();
        assert!(azure_api_details(&provider, &mut cache, &azure_host()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_host_without_linkage_yields_none() {
        let provider = MockAzureProvider::new(false);
        let mut cache = AzureApiCache::new();
        let host = HostEntity::new("victim00");
        assert!(azure_api_details(&provider, &mut cache, &host).is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
