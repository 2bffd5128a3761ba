//! # azfluent – compute
//!
//! - **Virtual Machines** – define from marketplace / popular / custom images, power actions,
//!   instance view, sizes, run-command, data disk and size updates
//! - **Availability Sets** – fault / update domains, Aligned or Classic sku
//! - **Disks** – empty, copied, from image or imported VHD; resize; SAS access grants
//! - **Snapshots** – full or incremental copies of disks; SAS access grants

pub mod types;
pub mod images;
pub mod virtual_machines;
pub mod availability_sets;
pub mod disks;
pub mod snapshots;
pub mod manager;

pub use availability_sets::{
    AvailabilitySet, AvailabilitySetDefinition, AvailabilitySetSkuType, AvailabilitySetUpdate,
    AvailabilitySets,
};
pub use disks::{Disk, DiskDefinition, DiskUpdate, Disks};
pub use images::{KnownLinuxImage, KnownWindowsImage};
pub use manager::ComputeManager;
pub use snapshots::{Snapshot, SnapshotDefinition, SnapshotUpdate, Snapshots};
pub use types::{AccessLevel, CachingType, OperatingSystemType, StorageAccountType};
pub use virtual_machines::{
    PowerState, VirtualMachine, VirtualMachineDefinition, VirtualMachineUpdate, VirtualMachines,
};
