//! Catalog of known Android partitions.

use camino::Utf8Path;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionGroup {
    Bootloader,
    /// Single system image partitions.
    Ssi,
    Treble,
    Data,
}

/// Identity of an Android partition.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PartitionModel {
    pub name: &'static str,
    pub group: PartitionGroup,
    mount_points: &'static [&'static str],
    proprietary_files_prefix: &'static str,
}

/// A partition mounted at `/<name>` whose files live under `<name>/`.
macro_rules! partition {
    ($name:literal, $group:ident) => {
        PartitionModel {
            name: $name,
            group: PartitionGroup::$group,
            mount_points: &[concat!("/", $name)],
            proprietary_files_prefix: $name,
        }
    };
}

impl PartitionModel {
    pub const BOOT: Self = partition!("boot", Bootloader);
    pub const DTBO: Self = partition!("dtbo", Bootloader);
    pub const RECOVERY: Self = partition!("recovery", Bootloader);
    pub const MISC: Self = partition!("misc", Bootloader);
    pub const VBMETA: Self = partition!("vbmeta", Bootloader);
    pub const VBMETA_SYSTEM: Self = partition!("vbmeta_system", Bootloader);
    pub const VBMETA_VENDOR: Self = partition!("vbmeta_vendor", Bootloader);
    pub const VENDOR_BOOT: Self = partition!("vendor_boot", Bootloader);
    pub const VENDOR_KERNEL_BOOT: Self = partition!("vendor_kernel_boot", Bootloader);
    pub const INIT_BOOT: Self = partition!("init_boot", Bootloader);

    pub const SYSTEM: Self = Self {
        name: "system",
        group: PartitionGroup::Ssi,
        mount_points: &["/system", "/"],
        proprietary_files_prefix: "",
    };
    pub const PRODUCT: Self = partition!("product", Ssi);
    pub const SYSTEM_EXT: Self = partition!("system_ext", Ssi);
    pub const SYSTEM_DLKM: Self = partition!("system_dlkm", Ssi);

    pub const VENDOR: Self = partition!("vendor", Treble);
    pub const ODM: Self = partition!("odm", Treble);
    pub const ODM_DLKM: Self = partition!("odm_dlkm", Treble);
    pub const VENDOR_DLKM: Self = partition!("vendor_dlkm", Treble);

    pub const USERDATA: Self = partition!("data", Data);
    pub const CACHE: Self = partition!("cache", Data);
    pub const METADATA: Self = partition!("metadata", Data);

    /// Every known partition, in catalog order.
    pub fn all() -> &'static [PartitionModel] {
        ALL
    }

    pub fn from_name(name: &str) -> Option<&'static PartitionModel> {
        ALL.iter().find(|model| model.name == name)
    }

    pub fn from_group(group: PartitionGroup) -> Vec<&'static PartitionModel> {
        ALL.iter().filter(|model| model.group == group).collect()
    }

    pub fn from_mount_point(mount_point: &str) -> Option<&'static PartitionModel> {
        ALL.iter().find(|model| model.has_mount_point(mount_point))
    }

    pub fn mount_points(&self) -> &'static [&'static str] {
        self.mount_points
    }

    pub fn has_mount_point(&self, mount_point: &str) -> bool {
        self.mount_points.contains(&mount_point)
    }

    /// Path prefix of this partition's entries in a proprietary-files list.
    pub fn proprietary_files_prefix(&self) -> &'static Utf8Path {
        Utf8Path::new(self.proprietary_files_prefix)
    }
}

impl fmt::Display for PartitionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

static ALL: &[PartitionModel] = &[
    PartitionModel::BOOT,
    PartitionModel::DTBO,
    PartitionModel::RECOVERY,
    PartitionModel::MISC,
    PartitionModel::VBMETA,
    PartitionModel::VBMETA_SYSTEM,
    PartitionModel::VBMETA_VENDOR,
    PartitionModel::VENDOR_BOOT,
    PartitionModel::VENDOR_KERNEL_BOOT,
    PartitionModel::INIT_BOOT,
    PartitionModel::SYSTEM,
    PartitionModel::PRODUCT,
    PartitionModel::SYSTEM_EXT,
    PartitionModel::SYSTEM_DLKM,
    PartitionModel::VENDOR,
    PartitionModel::ODM,
    PartitionModel::ODM_DLKM,
    PartitionModel::VENDOR_DLKM,
    PartitionModel::USERDATA,
    PartitionModel::CACHE,
    PartitionModel::METADATA,
];
