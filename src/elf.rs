use camino::{Utf8Path, Utf8PathBuf};
use goblin::elf::Elf;
use memmap2::Mmap;
use std::collections::BTreeSet;
use std::fs::File;
use tracing::debug;

/// An ELF object and the libraries it links against (`DT_NEEDED`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfFile {
    pub path: Utf8PathBuf,
    pub is_64bit: bool,
    pub needed_libraries: BTreeSet<String>,
}

impl ElfFile {
    /// Parse `path`, failing if it is not an ELF object.
    pub fn from_path<P: AsRef<Utf8Path>>(path: P) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the mapping is only read while `file` is open and nothing in
        // this process writes to it.
        let mmap = unsafe { Mmap::map(&file)? };
        let elf = Elf::parse(&mmap)?;

        Ok(Self {
            path: path.to_owned(),
            is_64bit: elf.is_64,
            needed_libraries: extract_needed(&elf),
        })
    }
}

fn extract_needed(elf: &Elf) -> BTreeSet<String> {
    elf.libraries.iter().map(|lib| lib.to_string()).collect()
}

/// Needed libraries of `path`, or an empty set if it can't be parsed.
pub fn needed_libraries<P: AsRef<Utf8Path>>(path: P) -> BTreeSet<String> {
    let path = path.as_ref();
    match ElfFile::from_path(path) {
        Ok(elf) => elf.needed_libraries,
        Err(e) => {
            debug!("Not reading needed libraries of {}: {}", path, e);
            BTreeSet::new()
        }
    }
}
