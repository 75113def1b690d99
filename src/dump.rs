//! Partitions of an extracted firmware dump.
//!
//! A dump is a directory holding one subdirectory per partition
//! (`system/`, `vendor/`, ...). The tree is walked once and every partition
//! receives its own share of the file list.

use crate::device_info::DeviceInfo;
use crate::fstab::Fstab;
use crate::partition::{discover_files, AndroidPartition};
use crate::partition_model::{PartitionGroup, PartitionModel};
use crate::props::BuildProp;
use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

/// Where the fstab lives, relative to the dump root.
const FSTAB_PATTERNS: [&str; 2] = ["vendor/etc/fstab.*", "system/vendor/etc/fstab.*"];

#[derive(Debug)]
pub struct Dump {
    pub path: Utf8PathBuf,
    partitions: Vec<AndroidPartition>,
    fstab: Option<Fstab>,
}

impl Dump {
    /// Open a dump, locating its fstab automatically.
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let fstab = match find_fstab(path)? {
            Some(fstab_path) => Some(Fstab::from_file(&fstab_path)?),
            None => {
                warn!("No fstab found in {}", path);
                None
            }
        };

        Self::with_fstab(path, fstab)
    }

    /// Open a dump using the given fstab instead of looking for one.
    pub fn with_fstab<P: AsRef<Utf8Path>>(path: P, fstab: Option<Fstab>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::PartitionNotFound(path.to_owned()));
        }

        let files = discover_files(path);
        info!("Found {} files in {}", files.len(), path);

        let mut partitions = Vec::new();
        for model in PartitionModel::all()
            .iter()
            .filter(|model| matches!(model.group, PartitionGroup::Ssi | PartitionGroup::Treble))
        {
            let Some(partition_path) = partition_path(path, model) else {
                debug!("Partition {} not present", model);
                continue;
            };

            let share: Vec<Utf8PathBuf> = files
                .iter()
                .filter(|file| file.starts_with(&partition_path))
                .cloned()
                .collect();

            let mut partition = AndroidPartition::builder()
                .model(model)
                .path(partition_path)
                .files(share)
                .build()?;

            if let Some(fstab) = &fstab {
                partition.fill_fstab_entry(fstab);
            }

            partitions.push(partition);
        }

        Ok(Self {
            path: path.to_owned(),
            partitions,
            fstab,
        })
    }

    pub fn partitions(&self) -> &[AndroidPartition] {
        &self.partitions
    }

    pub fn partitions_mut(&mut self) -> &mut [AndroidPartition] {
        &mut self.partitions
    }

    pub fn partition(&self, name: &str) -> Option<&AndroidPartition> {
        self.partitions.iter().find(|partition| partition.model.name == name)
    }

    pub fn partition_mut(&mut self, name: &str) -> Option<&mut AndroidPartition> {
        self.partitions.iter_mut().find(|partition| partition.model.name == name)
    }

    pub fn fstab(&self) -> Option<&Fstab> {
        self.fstab.as_ref()
    }

    /// Props of every partition merged in catalog order; later partitions
    /// override earlier ones.
    pub fn build_prop(&self) -> BuildProp {
        let mut build_prop = BuildProp::new();
        for partition in &self.partitions {
            build_prop.import_props(&partition.build_prop);
        }
        build_prop
    }

    pub fn device_info(&self) -> Result<DeviceInfo, Error> {
        DeviceInfo::new(&self.build_prop())
    }
}

/// Directory of `model` inside the dump.
///
/// System-as-root dumps keep the real system partition in `system/system`.
fn partition_path(dump: &Utf8Path, model: &PartitionModel) -> Option<Utf8PathBuf> {
    let path = dump.join(model.name);
    if !path.is_dir() {
        return None;
    }

    if *model == PartitionModel::SYSTEM && path.join("system/build.prop").is_file() {
        return Some(path.join("system"));
    }

    Some(path)
}

/// First fstab found in the dump, in `FSTAB_PATTERNS` order.
pub fn find_fstab(dump: &Utf8Path) -> Result<Option<Utf8PathBuf>, Error> {
    for pattern in FSTAB_PATTERNS {
        let full_pattern = dump.join(pattern);
        let mut matches: Vec<Utf8PathBuf> = glob::glob(full_pattern.as_str())?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter_map(|path| Utf8PathBuf::from_path_buf(path).ok())
            .collect();
        matches.sort();

        if let Some(fstab) = matches.into_iter().next() {
            debug!("Using fstab {}", fstab);
            return Ok(Some(fstab));
        }
    }

    Ok(None)
}
