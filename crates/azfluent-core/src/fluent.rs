//! Traits and helpers shared by the fluent wrapper and definition layers.
//!
//! A definition is a plain mutable struct: chained `with_*` setters record
//! intent and `create()` validates everything at once before the first
//! request goes out. Updates work the same way through `apply()`.

use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use serde_json::json;

use crate::client::AzureClient;
use crate::region::Region;
use crate::resource_id::{resource_group_from_id, ResourceId};
use crate::types::{AzureError, AzureResult};

// ─── Wrapper traits ─────────────────────────────────────────────────

/// Exposes the wire model a wrapper was built from.
pub trait HasInner {
    type Inner;

    fn inner(&self) -> &Self::Inner;
}

/// Common getters of every ARM resource.
pub trait Resource {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn resource_type(&self) -> &str;
    fn region_name(&self) -> &str;
    fn tags(&self) -> &HashMap<String, String>;

    fn region(&self) -> Region {
        Region::from_name(self.region_name())
    }
}

/// A resource that lives inside a resource group.
pub trait GroupableResource: Resource {
    fn resource_group_name(&self) -> String {
        resource_group_from_id(self.id()).unwrap_or_default()
    }
}

/// Implements [`Resource`], [`GroupableResource`] and [`HasInner`] for a
/// wrapper whose `inner` field carries `id`, `name`, `resource_type`,
/// `location` (all `Option<String>`) and `tags`.
#[macro_export]
macro_rules! impl_groupable_resource {
    ($wrapper:ty, $inner:ty) => {
        impl $crate::fluent::HasInner for $wrapper {
            type Inner = $inner;

            fn inner(&self) -> &$inner {
                &self.inner
            }
        }

        impl $crate::fluent::Resource for $wrapper {
            fn id(&self) -> &str {
                self.inner.id.as_deref().unwrap_or_default()
            }

            fn name(&self) -> &str {
                self.inner.name.as_deref().unwrap_or_default()
            }

            fn resource_type(&self) -> &str {
                self.inner.resource_type.as_deref().unwrap_or_default()
            }

            fn region_name(&self) -> &str {
                self.inner.location.as_deref().unwrap_or_default()
            }

            fn tags(&self) -> &::std::collections::HashMap<String, String> {
                &self.inner.tags
            }
        }

        impl $crate::fluent::GroupableResource for $wrapper {}
    };
}

// ─── Lifecycle traits ───────────────────────────────────────────────

#[async_trait]
pub trait Creatable: Send + Sized {
    type Output: Send;

    async fn create(self) -> AzureResult<Self::Output>;
}

#[async_trait]
pub trait Appliable: Send + Sized {
    type Output: Send;

    async fn apply(self) -> AzureResult<Self::Output>;
}

#[async_trait]
pub trait Refreshable: Send {
    /// Re-read the resource from the service, replacing the cached model.
    async fn refresh(&mut self) -> AzureResult<()>;
}

/// Run several definitions concurrently; fails with the first error.
pub async fn create_all<C: Creatable>(definitions: Vec<C>) -> AzureResult<Vec<C::Output>> {
    futures::future::try_join_all(definitions.into_iter().map(Creatable::create)).await
}

// ─── Collection traits ──────────────────────────────────────────────

#[async_trait]
pub trait SupportsListing: Send + Sync {
    type Item: Send;

    async fn list(&self) -> AzureResult<Vec<Self::Item>>;
}

#[async_trait]
pub trait SupportsListingByResourceGroup: Send + Sync {
    type Item: Send;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<Self::Item>>;
}

#[async_trait]
pub trait SupportsGettingByResourceGroup: Send + Sync {
    type Item: Send;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<Self::Item>;

    async fn get_by_id(&self, id: &str) -> AzureResult<Self::Item> {
        let rid = ResourceId::parse(id)?;
        let rg = rid
            .resource_group_name()
            .ok_or_else(AzureError::resource_group_required)?;
        self.get_by_resource_group(rg, rid.name()).await
    }
}

#[async_trait]
pub trait SupportsDeletingByResourceGroup: Send + Sync {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()>;

    async fn delete_by_id(&self, id: &str) -> AzureResult<()> {
        let rid = ResourceId::parse(id)?;
        let rg = rid
            .resource_group_name()
            .ok_or_else(AzureError::resource_group_required)?;
        self.delete_by_resource_group(rg, rid.name()).await
    }
}

// ─── Definition state ───────────────────────────────────────────────

/// Name, region, resource group and tags captured by every groupable
/// definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupableSpec {
    pub name: String,
    pub region: Option<Region>,
    pub resource_group: Option<String>,
    pub create_resource_group: bool,
    pub tags: HashMap<String, String>,
}

impl GroupableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name, region and resource group must all be present.
    pub fn validate(&self) -> AzureResult<()> {
        self.validate_placement()?;
        if self.region.is_none() {
            return Err(AzureError::required("region"));
        }
        Ok(())
    }

    /// Name and resource group; for resources whose location is fixed.
    pub fn validate_placement(&self) -> AzureResult<()> {
        if self.name.trim().is_empty() {
            return Err(AzureError::required("name"));
        }
        self.resource_group().map(|_| ())
    }

    pub fn resource_group(&self) -> AzureResult<&str> {
        self.resource_group
            .as_deref()
            .filter(|rg| !rg.trim().is_empty())
            .ok_or_else(|| AzureError::required("resourceGroupName"))
    }

    pub fn region_name(&self) -> AzureResult<String> {
        self.region
            .as_ref()
            .map(|r| r.name().to_string())
            .ok_or_else(|| AzureError::required("region"))
    }

    /// PUT the resource group first when the definition asked for a new one.
    pub async fn ensure_resource_group(&self, client: &AzureClient) -> AzureResult<()> {
        if !self.create_resource_group {
            return Ok(());
        }
        let rg = self.resource_group()?;
        let url = format!(
            "{}?api-version={}",
            client.resource_group_url(rg, "")?,
            client.config().api_version_resources
        );
        let body = json!({ "location": self.region_name()? });
        let _: serde_json::Value = client.put_json(&url, &body).await?;
        info!("Created resource group {} for {}", rg, self.name);
        Ok(())
    }
}

/// Shared setters of every definition that targets a resource group.
pub trait GroupableDefinition: Sized {
    fn spec_mut(&mut self) -> &mut GroupableSpec;

    fn with_region(mut self, region: impl Into<Region>) -> Self {
        self.spec_mut().region = Some(region.into());
        self
    }

    fn with_existing_resource_group(mut self, name: impl Into<String>) -> Self {
        let spec = self.spec_mut();
        spec.resource_group = Some(name.into());
        spec.create_resource_group = false;
        self
    }

    /// The group is created in the definition's region before the resource.
    fn with_new_resource_group(mut self, name: impl Into<String>) -> Self {
        let spec = self.spec_mut();
        spec.resource_group = Some(name.into());
        spec.create_resource_group = true;
        self
    }

    fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec_mut().tags.insert(key.into(), value.into());
        self
    }

    fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.spec_mut().tags = tags;
        self
    }
}

/// Tag editing shared by update builders.
pub trait TaggableUpdate: Sized {
    fn tags_mut(&mut self) -> &mut HashMap<String, String>;

    fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags_mut().insert(key.into(), value.into());
        self
    }

    fn without_tag(mut self, key: &str) -> Self {
        self.tags_mut().remove(key);
        self
    }

    fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        *self.tags_mut() = tags;
        self
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_client;
    use crate::types::AzureErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct Def {
        spec: GroupableSpec,
    }

    impl GroupableDefinition for Def {
        fn spec_mut(&mut self) -> &mut GroupableSpec {
            &mut self.spec
        }
    }

    struct Counted {
        n: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Creatable for Counted {
        type Output = usize;

        async fn create(self) -> AzureResult<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.n == 99 {
                return Err(AzureError::validation("boom"));
            }
            Ok(self.n * 2)
        }
    }

    #[test]
    fn setters_are_observable() {
        let d = Def::default()
            .with_region(Region::US_WEST)
            .with_new_resource_group("rg1")
            .with_tag("env", "dev");
        assert_eq!(d.spec.region, Some(Region::US_WEST));
        assert_eq!(d.spec.resource_group.as_deref(), Some("rg1"));
        assert!(d.spec.create_resource_group);
        assert_eq!(d.spec.tags.get("env").map(String::as_str), Some("dev"));

        let d = d.with_existing_resource_group("rg2");
        assert!(!d.spec.create_resource_group);
    }

    #[test]
    fn validate_reports_missing_fields() {
        let spec = GroupableSpec::new("");
        assert_eq!(
            spec.validate().unwrap_err().message,
            "Parameter name is required and cannot be null."
        );

        let spec = GroupableSpec::new("x");
        assert!(spec.validate().unwrap_err().message.contains("resourceGroupName"));

        let mut spec = GroupableSpec::new("x");
        spec.resource_group = Some("rg".into());
        assert!(spec.validate_placement().is_ok());
        let err = spec.validate().unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(err.message.contains("region"));
    }

    #[tokio::test]
    async fn create_all_runs_every_definition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let defs = (1..=3)
            .map(|n| Counted { n, calls: calls.clone() })
            .collect();
        let out = create_all(defs).await.unwrap();
        assert_eq!(out, vec![2, 4, 6]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn create_all_surfaces_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let defs = vec![
            Counted { n: 1, calls: calls.clone() },
            Counted { n: 99, calls: calls.clone() },
        ];
        assert!(create_all(defs).await.is_err());
    }

    #[tokio::test]
    async fn ensure_resource_group_puts_group() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/subscriptions/sub1/resourceGroups/newrg"))
            .and(body_partial_json(serde_json::json!({"location": "westus"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "name": "newrg", "location": "westus",
                "properties": {"provisioningState": "Succeeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let spec = Def::default()
            .with_region("West US")
            .with_new_resource_group("newrg")
            .spec;
        spec.ensure_resource_group(&client).await.unwrap();

        let existing = Def::default().with_existing_resource_group("rg").spec;
        existing.ensure_resource_group(&client).await.unwrap();
    }
}
