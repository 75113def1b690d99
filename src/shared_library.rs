use crate::elf::ElfFile;
use crate::partition::AndroidPartition;
use crate::Error;
use camino::Utf8Path;
use std::collections::BTreeSet;

/// A shared library shipped by a partition, in `lib/`, `lib64/` or both.
#[derive(Debug, Clone)]
pub struct SharedLibrary {
    /// Name without the `.so` extension.
    pub name: String,
    pub lib_32: Option<ElfFile>,
    pub lib_64: Option<ElfFile>,
    pub needed_libraries: BTreeSet<String>,
}

impl SharedLibrary {
    /// Look up `<name>.so` in the partition's `lib` and `lib64` directories.
    pub fn new(name: &str, partition: &AndroidPartition) -> Result<Self, Error> {
        let filename = format!("{name}.so");

        let lib_32 = open_if_present(&partition.path.join("lib").join(&filename))?;
        let lib_64 = open_if_present(&partition.path.join("lib64").join(&filename))?;

        if lib_32.is_none() && lib_64.is_none() {
            return Err(Error::LibraryNotFound {
                name: name.to_string(),
                partition: partition.path.clone(),
            });
        }

        Self::from_variants(name, lib_32, lib_64)
    }

    /// Combine the 32-bit and 64-bit variants of a library.
    ///
    /// Both variants must link against the same libraries.
    pub fn from_variants(
        name: &str,
        lib_32: Option<ElfFile>,
        lib_64: Option<ElfFile>,
    ) -> Result<Self, Error> {
        if let (Some(lib_32), Some(lib_64)) = (&lib_32, &lib_64) {
            if lib_32.needed_libraries != lib_64.needed_libraries {
                return Err(Error::MultilibMismatch(name.to_string()));
            }
        }

        let needed_libraries = lib_64
            .as_ref()
            .or(lib_32.as_ref())
            .map(|lib| lib.needed_libraries.clone())
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            lib_32,
            lib_64,
            needed_libraries,
        })
    }

    pub fn is_multilib(&self) -> bool {
        self.lib_32.is_some() && self.lib_64.is_some()
    }

    /// Path of the 64-bit variant if there is one, else the 32-bit one.
    pub fn path(&self) -> Option<&Utf8Path> {
        self.lib_64
            .as_ref()
            .or(self.lib_32.as_ref())
            .map(|lib| lib.path.as_path())
    }
}

fn open_if_present(path: &Utf8Path) -> Result<Option<ElfFile>, Error> {
    if path.is_file() {
        ElfFile::from_path(path).map(Some)
    } else {
        Ok(None)
    }
}
