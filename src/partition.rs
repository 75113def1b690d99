//! A partition of an extracted Android dump.
//!
//! Collects the files of the partition, its build props and the location of
//! its VINTF manifest, and can be matched against an fstab entry.

use crate::fstab::{Fstab, FstabEntry};
use crate::partition_model::PartitionModel;
use crate::props::BuildProp;
use crate::reorder::sort_files;
use crate::Error;
use bon::bon;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const BUILD_PROP_LOCATIONS: [&str; 2] = ["build.prop", "etc/build.prop"];
const DEFAULT_PROP_LOCATIONS: [&str; 2] = ["default.prop", "etc/default.prop"];
const MANIFEST_LOCATIONS: [&str; 2] = ["manifest.xml", "etc/vintf/manifest.xml"];

#[derive(Debug, Clone)]
pub struct AndroidPartition {
    pub model: &'static PartitionModel,
    pub path: Utf8PathBuf,
    files: Vec<Utf8PathBuf>,
    pub build_prop: BuildProp,
    /// VINTF manifest of this partition, if it ships one.
    pub manifest: Option<Utf8PathBuf>,
    pub fstab_entry: Option<FstabEntry>,
}

#[bon]
impl AndroidPartition {
    /// Build a partition rooted at `path`.
    ///
    /// When `files` is given it is used instead of walking `path`, keeping
    /// only the entries below `path`. This lets callers enumerate a whole
    /// dump once and hand each partition its share.
    #[builder]
    pub fn new(
        model: &'static PartitionModel,
        #[builder(into)] path: Utf8PathBuf,
        files: Option<Vec<Utf8PathBuf>>,
    ) -> Result<Self, Error> {
        if !path.is_dir() {
            return Err(Error::PartitionNotFound(path));
        }

        let files = match files {
            Some(files) => files
                .into_iter()
                .filter(|file| is_below(&path, file))
                .collect(),
            None => discover_files(&path),
        };

        debug!("Partition {} at {}: {} files", model, path, files.len());

        let mut build_prop = BuildProp::new();
        for locations in [&BUILD_PROP_LOCATIONS, &DEFAULT_PROP_LOCATIONS] {
            if let Some(prop_path) = find_first(&path, locations) {
                build_prop.import_file(&prop_path)?;
            }
        }

        let manifest = find_first(&path, &MANIFEST_LOCATIONS);

        Ok(Self {
            model,
            path,
            files,
            build_prop,
            manifest,
            fstab_entry: None,
        })
    }

    pub fn from_path(
        model: &'static PartitionModel,
        path: impl Into<Utf8PathBuf>,
    ) -> Result<Self, Error> {
        Self::builder().model(model).path(path).build()
    }
}

impl AndroidPartition {
    /// Files of the partition in proprietary-files order.
    pub fn files(&mut self) -> &[Utf8PathBuf] {
        sort_files(&mut self.files);
        &self.files
    }

    /// Files in discovery order, without sorting.
    pub fn unsorted_files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// `file` relative to the partition, under the proprietary-files prefix.
    pub fn formatted_file(&self, file: &Utf8Path) -> Result<Utf8PathBuf, Error> {
        let relative = file
            .strip_prefix(&self.path)
            .map_err(|_| Error::OutsidePartition {
                file: file.to_owned(),
                root: self.path.clone(),
            })?;

        Ok(self.model.proprietary_files_prefix().join(relative))
    }

    pub fn formatted_files(&mut self) -> Vec<Utf8PathBuf> {
        sort_files(&mut self.files);
        self.files
            .iter()
            .filter_map(|file| self.formatted_file(file).ok())
            .collect()
    }

    /// Pick the first fstab entry mounted at one of this partition's mount
    /// points.
    pub fn fill_fstab_entry(&mut self, fstab: &Fstab) {
        self.fstab_entry = fstab
            .entries()
            .iter()
            .find(|entry| self.model.has_mount_point(&entry.mount_point))
            .cloned();

        match &self.fstab_entry {
            Some(entry) => debug!("{} mounted at {}", self.model, entry.mount_point),
            None => debug!("No fstab entry for {}", self.model),
        }
    }
}

/// Whether `file` names something strictly inside `root`, without `..`
/// steps that could lead back out of it.
fn is_below(root: &Utf8Path, file: &Utf8Path) -> bool {
    match file.strip_prefix(root) {
        Ok(relative) => {
            !relative.as_str().is_empty()
                && relative
                    .components()
                    .all(|component| matches!(component, Utf8Component::Normal(_)))
        }
        Err(_) => false,
    }
}

fn find_first(root: &Utf8Path, candidates: &[&str]) -> Option<Utf8PathBuf> {
    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Every regular file below `root`, in filesystem order.
///
/// Symlinks are followed; dangling ones are skipped.
pub fn discover_files(root: &Utf8Path) -> Vec<Utf8PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping entry under {}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => Some(path),
            Err(path) => {
                warn!("Skipping non UTF-8 path {}", path.display());
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Utf8Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn build_prop_takes_first_location_only() {
        let (_dir, root) = tempdir();
        write(&root, "build.prop", "ro.a=root\n");
        write(&root, "etc/build.prop", "ro.a=etc\nro.b=etc\n");

        let partition = AndroidPartition::from_path(&PartitionModel::VENDOR, &root).unwrap();

        assert_eq!(partition.build_prop.get("ro.a"), Some("root"));
        assert_eq!(partition.build_prop.get("ro.b"), None);
    }

    #[test]
    fn default_prop_overrides_build_prop() {
        let (_dir, root) = tempdir();
        write(&root, "etc/build.prop", "ro.a=build\nro.b=build\n");
        write(&root, "etc/default.prop", "ro.b=default\nro.c=default\n");

        let partition = AndroidPartition::from_path(&PartitionModel::ODM, &root).unwrap();

        assert_eq!(partition.build_prop.get("ro.a"), Some("build"));
        assert_eq!(partition.build_prop.get("ro.b"), Some("default"));
        assert_eq!(partition.build_prop.get("ro.c"), Some("default"));
    }

    #[test]
    fn finds_manifest() {
        let (_dir, root) = tempdir();
        write(&root, "etc/vintf/manifest.xml", "<manifest/>");

        let partition = AndroidPartition::from_path(&PartitionModel::VENDOR, &root).unwrap();
        assert_eq!(partition.manifest, Some(root.join("etc/vintf/manifest.xml")));
        assert!(partition.build_prop.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let (_dir, root) = tempdir();
        let result = AndroidPartition::from_path(&PartitionModel::VENDOR, root.join("vendor"));
        assert!(matches!(result, Err(Error::PartitionNotFound(_))));
    }

    #[test]
    fn supplied_files_are_limited_to_root() {
        let (_dir, root) = tempdir();
        let vendor = root.join("vendor");
        write(&vendor, "bin/foo", "");

        let partition = AndroidPartition::builder()
            .model(&PartitionModel::VENDOR)
            .path(&vendor)
            .files(vec![
                root.join("vendor/bin/foo"),
                root.join("vendor_dlkm/lib/modules/foo.ko"),
                root.join("system/bin/sh"),
                vendor.clone(),
            ])
            .build()
            .unwrap();

        assert_eq!(partition.unsorted_files(), [root.join("vendor/bin/foo")]);
    }

    #[test]
    fn supplied_files_cannot_climb_out_of_root() {
        let (_dir, root) = tempdir();
        let vendor = root.join("vendor");
        write(&vendor, "bin/foo", "");
        write(&root, "system/bin/sh", "");

        let mut partition = AndroidPartition::builder()
            .model(&PartitionModel::VENDOR)
            .path(&vendor)
            .files(vec![
                root.join("vendor/../system/bin/sh"),
                root.join("vendor/bin/../../system/bin/sh"),
                root.join("vendor/bin/foo"),
            ])
            .build()
            .unwrap();

        assert_eq!(partition.unsorted_files(), [root.join("vendor/bin/foo")]);
        assert_eq!(partition.formatted_files(), [Utf8PathBuf::from("vendor/bin/foo")]);
    }

    #[cfg(unix)]
    #[test]
    fn discovery_follows_symlinks_and_skips_dangling_ones() {
        use std::os::unix::fs::symlink;

        let (_dir, root) = tempdir();
        let outside = root.join("outside");
        let vendor = root.join("vendor");
        write(&outside, "firmware/a.bin", "");
        write(&vendor, "etc/b.conf", "");
        write(&vendor, "lib/libreal.so", "");
        symlink(outside.join("firmware"), vendor.join("firmware")).unwrap();
        symlink(vendor.join("lib/libreal.so"), vendor.join("lib/liblink.so")).unwrap();
        symlink(vendor.join("missing.so"), vendor.join("lib/libdangling.so")).unwrap();

        let mut files = discover_files(&vendor);
        files.sort();

        assert_eq!(
            files,
            [
                vendor.join("etc/b.conf"),
                vendor.join("firmware/a.bin"),
                vendor.join("lib/liblink.so"),
                vendor.join("lib/libreal.so"),
            ]
        );
    }

    #[test]
    fn formatted_files_use_prefix() {
        let (_dir, root) = tempdir();
        write(&root, "bin/sh", "");
        write(&root, "lib64/libc.so", "");
        write(&root, "build.prop", "ro.product.system.device=foo\n");

        let mut partition = AndroidPartition::from_path(&PartitionModel::SYSTEM, &root).unwrap();
        let formatted: Vec<String> = partition
            .formatted_files()
            .into_iter()
            .map(|p| p.into_string())
            .collect();
        assert_eq!(formatted, ["bin/sh", "lib64/libc.so", "build.prop"]);

        assert!(matches!(
            partition.formatted_file(Utf8Path::new("/elsewhere/file")),
            Err(Error::OutsidePartition { .. })
        ));
    }

    #[test]
    fn fill_fstab_entry_follows_fstab_order() {
        let (_dir, root) = tempdir();
        let fstab = Fstab::parse(
            "a / ext4 ro wait\nb /system ext4 ro wait\nc /vendor ext4 ro wait\n",
        )
        .unwrap();

        let mut system = AndroidPartition::from_path(&PartitionModel::SYSTEM, &root).unwrap();
        system.fill_fstab_entry(&fstab);
        assert_eq!(system.fstab_entry.as_ref().unwrap().src, "a");

        let mut odm = AndroidPartition::from_path(&PartitionModel::ODM, &root).unwrap();
        odm.fill_fstab_entry(&fstab);
        assert!(odm.fstab_entry.is_none());

        odm.fstab_entry = system.fstab_entry.clone();
        odm.fill_fstab_entry(&Fstab::default());
        assert!(odm.fstab_entry.is_none());
    }
}
