//! Common device information read from build props.

use crate::props::{fingerprint_to_description, parse_bool, partition_props, BuildProp};
use crate::Error;
use std::fmt;

const DEVICE_ARCH: &[&str] = &["ro.bionic.arch"];
const DEVICE_CPU_VARIANT: &[&str] = &["ro.bionic.cpu_variant"];
const DEVICE_SECOND_ARCH: &[&str] = &["ro.bionic.2nd_arch"];
const DEVICE_SECOND_CPU_VARIANT: &[&str] = &["ro.bionic.2nd_cpu_variant"];

const DEVICE_IS_AB: &[&str] = &["ro.build.ab_update"];
const DEVICE_USES_DYNAMIC_PARTITIONS: &[&str] = &["ro.boot.dynamic_partitions"];
const DEVICE_USES_VIRTUAL_AB: &[&str] = &["ro.virtual_ab.enabled"];
const DEVICE_USES_SYSTEM_AS_ROOT: &[&str] = &["ro.build.system_root_image"];

const BOOTLOADER_BOARD_NAME: &[&str] = &["ro.product.board"];
const DEVICE_PLATFORM: &[&str] = &["ro.board.platform"];
const DEVICE_PIXEL_FORMAT: &[&str] = &["ro.minui.pixel_format"];
const SCREEN_DENSITY: &[&str] = &["ro.sf.lcd_density"];
const USE_VULKAN: &[&str] = &["ro.hwui.use_vulkan"];

const GMS_CLIENTID_BASE: &[&str] = &["ro.com.google.clientidbase.ms", "ro.com.google.clientidbase"];

const BUILD_SECURITY_PATCH: &[&str] = &["ro.build.version.security_patch"];
const BUILD_VENDOR_SECURITY_PATCH: &[&str] = &["ro.vendor.build.security_patch"];

const FIRST_API_LEVEL: &[&str] = &["ro.product.first_api_level", "ro.build.version.sdk"];
const PRODUCT_CHARACTERISTICS: &[&str] = &["ro.build.characteristics"];
const APEX_UPDATABLE: &[&str] = &["ro.apex.updatable"];

const BOARD_FIRST_API_LEVEL: &[&str] = &["ro.board.first_api_level"];
const BOARD_API_LEVEL: &[&str] = &["ro.board.api_level"];

fn product_props(value: &str) -> Vec<String> {
    partition_props(&format!("ro.product.{{}}{value}"), true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArch {
    Arm,
    Arm64,
    X86,
    X86_64,
}

impl DeviceArch {
    const ALL: [DeviceArch; 4] = [Self::Arm, Self::Arm64, Self::X86, Self::X86_64];

    pub fn arch(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }

    pub fn arch_variant(self) -> &'static str {
        match self {
            Self::Arm => "armv7-a-neon",
            Self::Arm64 => "armv8-a",
            Self::X86 | Self::X86_64 => "generic",
        }
    }

    pub fn bitness(self) -> u32 {
        match self {
            Self::Arm | Self::X86 => 32,
            Self::Arm64 | Self::X86_64 => 64,
        }
    }

    pub fn cpu_abilist(self) -> &'static [&'static str] {
        match self {
            Self::Arm => &["armeabi-v7a", "armeabi"],
            Self::Arm64 => &["arm64-v8a"],
            Self::X86 => &["x86"],
            Self::X86_64 => &["x86_64"],
        }
    }

    pub fn cpu_abi(self) -> &'static str {
        self.cpu_abilist()[0]
    }

    pub fn cpu_abi2(self) -> &'static str {
        self.cpu_abilist().get(1).copied().unwrap_or("")
    }

    pub fn from_arch(arch: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.arch() == arch)
            .ok_or_else(|| Error::UnknownArch(arch.to_string()))
    }

    pub fn from_abi(abi: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.cpu_abilist().contains(&abi))
            .ok_or_else(|| Error::UnknownAbi(abi.to_string()))
    }
}

impl fmt::Display for DeviceArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arch())
    }
}

/// Device facts needed to generate a device tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub codename: String,
    pub manufacturer: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub build_fingerprint: Option<String>,
    pub build_description: String,

    pub arch: DeviceArch,
    pub second_arch: Option<DeviceArch>,
    pub cpu_variant: String,
    pub second_cpu_variant: String,

    pub bootloader_board_name: String,
    pub platform: String,
    pub device_is_ab: bool,
    pub device_uses_dynamic_partitions: bool,
    pub device_uses_virtual_ab: bool,
    pub device_uses_system_as_root: bool,
    pub device_uses_updatable_apex: bool,

    pub device_pixel_format: Option<String>,
    pub screen_density: Option<String>,
    pub use_vulkan: bool,
    pub gms_clientid_base: String,
    pub first_api_level: String,
    pub product_characteristics: String,

    pub build_security_patch: String,
    pub vendor_build_security_patch: String,

    pub board_first_api_level: Option<String>,
    pub board_api_level: Option<String>,
}

impl DeviceInfo {
    pub fn new(build_prop: &BuildProp) -> Result<Self, Error> {
        let props = PropLookup(build_prop);

        let codename = props.required(&product_props("device"))?;
        let manufacturer = props
            .required(&product_props("manufacturer"))?
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let brand = props.first(&product_props("brand"));
        let model = props.first(&product_props("model"));

        let build_fingerprint = props.first(&partition_props("ro.{}build.fingerprint", true));
        let description_props = partition_props("ro.{}build.description", true);
        let build_description = match (props.first(&description_props), &build_fingerprint) {
            (Some(description), _) => description,
            (None, Some(fingerprint)) => fingerprint_to_description(fingerprint)?,
            (None, None) => return Err(Error::MissingProperty(description_props[0].clone())),
        };

        let (arch, second_arch) = match props.first(DEVICE_ARCH) {
            Some(arch) => {
                let second_arch = props
                    .first(DEVICE_SECOND_ARCH)
                    .map(|arch| DeviceArch::from_arch(&arch))
                    .transpose()?;
                (DeviceArch::from_arch(&arch)?, second_arch)
            }
            None => {
                let abilist = props.required(&partition_props("ro.{}product.cpu.abilist", true))?;
                archs_from_abilist(&abilist)?
            }
        };

        let build_security_patch = props.required(BUILD_SECURITY_PATCH)?;
        let gms_default = format!("android-{manufacturer}");

        Ok(Self {
            cpu_variant: props.first_or(DEVICE_CPU_VARIANT, "generic"),
            second_cpu_variant: props.first_or(DEVICE_SECOND_CPU_VARIANT, "generic"),

            bootloader_board_name: props.required(BOOTLOADER_BOARD_NAME)?,
            platform: props.first_or(DEVICE_PLATFORM, "default"),
            device_is_ab: props.first_bool(DEVICE_IS_AB),
            device_uses_dynamic_partitions: props.first_bool(DEVICE_USES_DYNAMIC_PARTITIONS),
            device_uses_virtual_ab: props.first_bool(DEVICE_USES_VIRTUAL_AB),
            device_uses_system_as_root: props.first_bool(DEVICE_USES_SYSTEM_AS_ROOT),
            device_uses_updatable_apex: props.first_bool(APEX_UPDATABLE),

            device_pixel_format: props.first(DEVICE_PIXEL_FORMAT),
            screen_density: props.first(SCREEN_DENSITY),
            use_vulkan: props.first_bool(USE_VULKAN),
            gms_clientid_base: props.first_or(GMS_CLIENTID_BASE, &gms_default),
            first_api_level: props.required(FIRST_API_LEVEL)?,
            product_characteristics: props.first_or(PRODUCT_CHARACTERISTICS, ""),

            vendor_build_security_patch: props
                .first_or(BUILD_VENDOR_SECURITY_PATCH, &build_security_patch),
            build_security_patch,

            board_first_api_level: props.first(BOARD_FIRST_API_LEVEL),
            board_api_level: props.first(BOARD_API_LEVEL),

            codename,
            manufacturer,
            brand,
            model,
            build_fingerprint,
            build_description,
            arch,
            second_arch,
        })
    }
}

/// Primary and secondary arch from a comma separated ABI list, higher
/// bitness first.
fn archs_from_abilist(abilist: &str) -> Result<(DeviceArch, Option<DeviceArch>), Error> {
    let mut archs: Vec<DeviceArch> = Vec::new();
    for abi in abilist.split(',').filter(|abi| !abi.is_empty()) {
        let arch = DeviceArch::from_abi(abi)?;
        if !archs.contains(&arch) {
            archs.push(arch);
        }
    }

    archs.sort_by_key(|arch| std::cmp::Reverse(arch.bitness()));

    match *archs.as_slice() {
        [arch] => Ok((arch, None)),
        [arch, second_arch] => Ok((arch, Some(second_arch))),
        _ => Err(Error::InvalidAbiList(abilist.to_string())),
    }
}

/// First-match lookups over a list of candidate prop names.
struct PropLookup<'a>(&'a BuildProp);

impl PropLookup<'_> {
    fn first<S: AsRef<str>>(&self, keys: &[S]) -> Option<String> {
        keys.iter()
            .find_map(|key| self.0.get(key.as_ref()))
            .map(str::to_string)
    }

    fn first_or<S: AsRef<str>>(&self, keys: &[S], default: &str) -> String {
        self.first(keys).unwrap_or_else(|| default.to_string())
    }

    /// Values that don't parse as booleans are skipped like missing ones.
    fn first_bool<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter()
            .find_map(|key| self.0.get(key.as_ref()).and_then(parse_bool))
            .unwrap_or(false)
    }

    fn required<S: AsRef<str>>(&self, keys: &[S]) -> Result<String, Error> {
        self.first(keys).ok_or_else(|| {
            Error::MissingProperty(keys.first().map(|k| k.as_ref().to_string()).unwrap_or_default())
        })
    }
}
