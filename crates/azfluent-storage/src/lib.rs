//! # azfluent – storage
//!
//! - **Storage Accounts** – sku, kind, access tier, TLS / HTTPS policy, HNS, network rules,
//!   keys and name availability
//! - **Blob Containers** – public access level and metadata
//! - **Management Policies** – lifecycle rules that tier or delete blobs by age

pub mod types;
pub mod storage_accounts;
pub mod blob_containers;
pub mod management_policies;
pub mod manager;

pub use blob_containers::{BlobContainer, BlobContainerDefinition, BlobContainerUpdate, BlobContainers};
pub use management_policies::{
    BlobTypes, ManagementPolicies, ManagementPolicy, ManagementPolicyDefinition, ManagementPolicyUpdate,
    PolicyRule,
};
pub use manager::StorageManager;
pub use storage_accounts::{
    validate_storage_account_name, StorageAccount, StorageAccountDefinition, StorageAccountUpdate,
    StorageAccounts,
};
pub use types::{AccessTier, MinimumTlsVersion, PublicAccess, StorageKind, StorageSkuName};
