// Error types for android-partitions
use camino::Utf8PathBuf;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("ELF parsing error: {0}")]
    Goblin(#[from] goblin::error::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Invalid UTF-8 in path")]
    InvalidPathUtf8,

    #[error("Invalid fstab entry at line {line}: {content:?}")]
    FstabParse { line: usize, content: String },

    #[error("Partition directory not found: {0}")]
    PartitionNotFound(Utf8PathBuf),

    #[error("{file} is not inside partition {root}")]
    OutsidePartition { file: Utf8PathBuf, root: Utf8PathBuf },

    #[error("Library {name} not found in {partition}")]
    LibraryNotFound { name: String, partition: Utf8PathBuf },

    #[error("32-bit and 64-bit versions of {0} have different dependencies")]
    MultilibMismatch(String),

    #[error("Property {0} could not be found in build.prop")]
    MissingProperty(String),

    #[error("Unknown arch: {0}")]
    UnknownArch(String),

    #[error("Unknown ABI: {0}")]
    UnknownAbi(String),

    #[error("Invalid ABI list: {0}")]
    InvalidAbiList(String),

    #[error("Malformed build fingerprint: {0}")]
    InvalidFingerprint(String),
}
