//! Parsing of ARM resource identifiers.
//!
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}`
//! optionally followed by `/{childType}/{childName}` pairs.

use std::fmt;
use std::str::FromStr;

use crate::types::{AzureError, AzureErrorKind, AzureResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    id: String,
    subscription_id: String,
    resource_group_name: Option<String>,
    provider_namespace: Option<String>,
    resource_type: String,
    name: String,
    parent_id: Option<String>,
}

fn invalid(id: &str, why: &str) -> AzureError {
    AzureError::new(
        AzureErrorKind::InvalidResourceId,
        format!("The specified ID {id} is not a valid Azure resource ID: {why}"),
    )
}

impl ResourceId {
    pub fn parse(id: &str) -> AzureResult<Self> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(invalid(id, "empty"));
        }
        let body = trimmed.trim_matches('/');
        let parts: Vec<&str> = body.split('/').collect();

        if parts.len() % 2 != 0 {
            return Err(invalid(id, "odd number of segments"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid(id, "empty segment"));
        }
        if !parts[0].eq_ignore_ascii_case("subscriptions") {
            return Err(invalid(id, "must start with /subscriptions"));
        }
        if parts.len() > 2 && !parts[2].eq_ignore_ascii_case("resourceGroups") {
            return Err(invalid(id, "expected resourceGroups segment"));
        }
        if parts.len() > 4 && !parts[4].eq_ignore_ascii_case("providers") {
            return Err(invalid(id, "expected providers segment"));
        }
        if parts.len() == 6 {
            return Err(invalid(id, "provider namespace without resource type"));
        }

        let subscription_id = parts[1].to_string();
        let resource_group_name = parts.get(3).map(|s| s.to_string());
        let provider_namespace = if parts.len() >= 8 {
            Some(parts[5].to_string())
        } else {
            None
        };

        let n = parts.len();
        let name = parts[n - 1].to_string();
        let resource_type = parts[n - 2].to_string();

        let parent_id = if n >= 10 {
            Some(format!("/{}", parts[..n - 2].join("/")))
        } else {
            None
        };

        Ok(Self {
            id: format!("/{body}"),
            subscription_id,
            resource_group_name,
            provider_namespace,
            resource_type,
            name,
            parent_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        self.resource_group_name.as_deref()
    }

    pub fn provider_namespace(&self) -> Option<&str> {
        self.provider_namespace.as_deref()
    }

    /// Last type segment, e.g. `databases` for a SQL database.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ResourceId> {
        self.parent_id
            .as_deref()
            .and_then(|p| ResourceId::parse(p).ok())
    }

    /// Namespace-qualified type including parents, e.g.
    /// `Microsoft.Sql/servers/databases`.
    pub fn full_resource_type(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}", parent.full_resource_type(), self.resource_type),
            None => match &self.provider_namespace {
                Some(ns) => format!("{}/{}", ns, self.resource_type),
                None => self.resource_type.clone(),
            },
        }
    }

    /// Path between the provider namespace and the leaf type, e.g.
    /// `servers/sql1` for a SQL database. Empty for top-level resources.
    pub fn parent_resource_path(&self) -> String {
        match &self.parent_id {
            Some(parent) => {
                let parts: Vec<&str> = parent.trim_matches('/').split('/').collect();
                parts.get(6..).map(|p| p.join("/")).unwrap_or_default()
            }
            None => String::new(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for ResourceId {
    type Err = AzureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resource group segment of an id, matched case-insensitively.
pub fn resource_group_from_id(id: &str) -> Option<String> {
    let parts: Vec<&str> = id.split('/').collect();
    parts
        .windows(2)
        .find(|w| w[0].eq_ignore_ascii_case("resourceGroups"))
        .map(|w| w[1].to_string())
        .filter(|s| !s.is_empty())
}

/// Last segment of an id.
pub fn name_from_id(id: &str) -> Option<String> {
    id.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a top-level resource id.
pub fn resource_id(
    subscription_id: &str,
    resource_group: &str,
    provider_namespace: &str,
    resource_type: &str,
    name: &str,
) -> String {
    format!(
        "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/{provider_namespace}/{resource_type}/{name}"
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
