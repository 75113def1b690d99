//! Android fstab parsing and formatting.

use crate::partition_model::PartitionModel;
use crate::Error;
use camino::Utf8Path;
use std::fmt;
use std::fs;
use tracing::debug;

/// Informational header for the generic format.
pub const FSTAB_HEADER: &str = "#<src>                                                 <mnt_point>            <type>  <mnt_flags and options>                            <fs_mgr_flags>\n";

/// Extra spaces added after the widest value of each column.
const COLUMN_PADDING: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstabEntry {
    pub src: String,
    pub mount_point: String,
    pub fs_type: String,
    pub mnt_flags: Vec<String>,
    /// fs_mgr flags.
    pub fs_flags: Vec<String>,
}

impl FstabEntry {
    pub fn is_logical(&self) -> bool {
        self.has_fs_flag("logical")
    }

    pub fn is_slotselect(&self) -> bool {
        self.has_fs_flag("slotselect")
    }

    fn has_fs_flag(&self, flag: &str) -> bool {
        self.fs_flags.iter().any(|f| f == flag)
    }

    /// Parse a single fstab line. `line_number` is only used for errors.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[src, mount_point, fs_type, mnt_flags, fs_flags] = fields.as_slice() else {
            return Err(Error::FstabParse {
                line: line_number,
                content: line.to_string(),
            });
        };

        Ok(Self {
            src: src.to_string(),
            mount_point: mount_point.to_string(),
            fs_type: fs_type.to_string(),
            mnt_flags: split_flags(mnt_flags),
            fs_flags: split_flags(fs_flags),
        })
    }

    /// Label shown by recovery, the last component of the mount point.
    fn display_name(&self) -> &str {
        Utf8Path::new(&self.mount_point).file_name().unwrap_or("")
    }

    fn recovery_flags(&self) -> String {
        let mut flags = vec![format!("display={}", self.display_name())];
        if self.is_logical() {
            flags.push("logical".to_string());
        }
        if self.is_slotselect() {
            flags.push("slotselect".to_string());
        }
        format!("flags={}", flags.join(";"))
    }
}

fn split_flags(flags: &str) -> Vec<String> {
    flags.split(',').map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FstabFormat {
    /// `src mount_point type mnt_flags fs_mgr_flags`
    #[default]
    Generic,
    /// `mount_point type src flags=...`, as consumed by custom recoveries.
    Recovery,
}

/// Entries of an fstab file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fstab {
    entries: Vec<FstabEntry>,
}

impl Fstab {
    /// Parse fstab text, stopping at the first malformed line.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut entries = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            entries.push(FstabEntry::parse_line(line, index + 1)?);
        }

        debug!("Parsed {} fstab entries", entries.len());

        Ok(Self { entries })
    }

    pub fn from_file<P: AsRef<Utf8Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Reading fstab {}", path);
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn entries(&self) -> &[FstabEntry] {
        &self.entries
    }

    pub fn get_by_mount_point(&self, mount_point: &str) -> Option<&FstabEntry> {
        self.entries.iter().find(|entry| entry.mount_point == mount_point)
    }

    pub fn logical_entries(&self) -> Vec<&FstabEntry> {
        self.entries.iter().filter(|entry| entry.is_logical()).collect()
    }

    pub fn slotselect_entries(&self) -> Vec<&FstabEntry> {
        self.entries.iter().filter(|entry| entry.is_slotselect()).collect()
    }

    /// Known partitions that are logical (live inside super).
    pub fn logical_partition_models(&self) -> Vec<&'static PartitionModel> {
        resolve_models(self.logical_entries())
    }

    /// Known partitions that are A/B slotted.
    pub fn ab_partition_models(&self) -> Vec<&'static PartitionModel> {
        resolve_models(self.slotselect_entries())
    }

    pub fn format(&self, style: FstabFormat) -> String {
        let mnt_flags: Vec<String> = self.entries.iter().map(|e| e.mnt_flags.join(",")).collect();

        let src_width = column_width(self.entries.iter().map(|e| e.src.as_str()));
        let mount_point_width = column_width(self.entries.iter().map(|e| e.mount_point.as_str()));
        let fs_type_width = column_width(self.entries.iter().map(|e| e.fs_type.as_str()));
        let mnt_flags_width = column_width(mnt_flags.iter().map(String::as_str));

        let mut out = String::new();
        for (entry, mnt_flags) in self.entries.iter().zip(&mnt_flags) {
            let line = match style {
                FstabFormat::Generic => format!(
                    "{:<src_width$}{:<mount_point_width$}{:<fs_type_width$}{:<mnt_flags_width$}{}",
                    entry.src,
                    entry.mount_point,
                    entry.fs_type,
                    mnt_flags,
                    entry.fs_flags.join(","),
                ),
                FstabFormat::Recovery => format!(
                    "{:<mount_point_width$}{:<fs_type_width$}{:<src_width$}{}",
                    entry.mount_point,
                    entry.fs_type,
                    entry.src,
                    entry.recovery_flags(),
                ),
            };
            out.push_str(&line);
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for Fstab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(FstabFormat::Generic))
    }
}

/// Widest cell plus padding, counted in chars as `{:<width$}` pads by chars.
fn column_width<'a>(cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(|cell| cell.chars().count()).max().unwrap_or(0) + COLUMN_PADDING
}

fn resolve_models(entries: Vec<&FstabEntry>) -> Vec<&'static PartitionModel> {
    let mut models: Vec<&'static PartitionModel> = Vec::new();

    for entry in entries {
        match PartitionModel::from_mount_point(&entry.mount_point) {
            Some(model) if !models.contains(&model) => models.push(model),
            Some(_) => {}
            None => debug!("No known partition mounted at {}", entry.mount_point),
        }
    }

    models
}
