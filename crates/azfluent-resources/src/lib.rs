//! # azfluent – resources
//!
//! - **Resource Groups** – list, get, contains, create, update tags, delete, export template
//! - **Generic Resources** – any provider type by coordinates or id, move between groups
//! - **Deployments** – template deployments with validate / what-if / cancel / export
//! - **Subscriptions** – list, get, locations
//! - **Providers** – list, get, register, unregister, api-version lookup
//! - **Tags** – subscription tag names and values

pub mod types;
pub mod resource_groups;
pub mod generic_resources;
pub mod deployments;
pub mod subscriptions;
pub mod providers;
pub mod tags;
pub mod manager;

pub use deployments::{Deployment, DeploymentDefinition, DeploymentUpdate, Deployments};
pub use generic_resources::{
    GenericResource, GenericResourceDefinition, GenericResourceUpdate, GenericResources,
    ResourceCoordinates,
};
pub use manager::ResourceManager;
pub use providers::{Provider, Providers};
pub use resource_groups::{ResourceGroup, ResourceGroupDefinition, ResourceGroupUpdate, ResourceGroups};
pub use subscriptions::{Subscription, Subscriptions};
pub use tags::Tags;
