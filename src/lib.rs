// android-partitions - Android dump modeling
// Apache-2.0, 2025

//! Models for the partitions of an extracted Android firmware dump.
//!
//! This library provides:
//! - A build prop store with typed getters ([`BuildProp`])
//! - The catalog of known partitions ([`PartitionModel`])
//! - fstab parsing and formatting ([`Fstab`])
//! - Per-partition file lists, props and fstab entries ([`AndroidPartition`])
//! - Proprietary-files ordering ([`reorder`])
//!
//! # Example: Inspect a vendor partition
//!
//! ```no_run
//! use android_partitions::{AndroidPartition, Fstab, PartitionModel};
//!
//! let mut vendor = AndroidPartition::from_path(&PartitionModel::VENDOR, "dump/vendor")?;
//! let fstab = Fstab::from_file("dump/vendor/etc/fstab.qcom")?;
//! vendor.fill_fstab_entry(&fstab);
//!
//! println!("{:?}", vendor.build_prop.get("ro.product.vendor.device"));
//! for file in vendor.formatted_files() {
//!     println!("{file}");
//! }
//! # Ok::<(), android_partitions::Error>(())
//! ```
//!
//! # Example: Open a whole dump
//!
//! ```no_run
//! use android_partitions::Dump;
//!
//! let dump = Dump::open("dump")?;
//! let info = dump.device_info()?;
//! println!("{} by {}", info.codename, info.manufacturer);
//! # Ok::<(), android_partitions::Error>(())
//! ```

pub mod device_info;
pub mod dump;
pub mod elf;
pub mod error;
pub mod fstab;
pub mod partition;
pub mod partition_model;
pub mod props;
pub mod reorder;
pub mod shared_library;
pub mod versions;

pub use device_info::{DeviceArch, DeviceInfo};
pub use dump::Dump;
pub use elf::ElfFile;
pub use error::Error;
pub use fstab::{Fstab, FstabEntry, FstabFormat, FSTAB_HEADER};
pub use partition::AndroidPartition;
pub use partition_model::{PartitionGroup, PartitionModel};
pub use props::BuildProp;
pub use shared_library::SharedLibrary;
pub use versions::AndroidVersion;
