//! Android releases and their API levels.

#[derive(Debug, PartialEq, Eq)]
pub struct AndroidVersion {
    pub version_code: &'static str,
    pub version_name: &'static str,
    pub api_level: u32,
}

const fn version(
    version_code: &'static str,
    version_name: &'static str,
    api_level: u32,
) -> AndroidVersion {
    AndroidVersion {
        version_code,
        version_name,
        api_level,
    }
}

static VERSIONS: &[AndroidVersion] = &[
    version("1.0", "1.0", 1),
    version("1.1", "1.1", 2),
    version("1.5", "Cupcake", 3),
    version("1.6", "Donut", 4),
    version("2.0", "Eclair", 5),
    version("2.0.1", "Eclair incremental update", 6),
    version("2.1", "Eclair MR1", 7),
    version("2.2", "Froyo", 8),
    version("2.3", "Gingerbread", 9),
    version("2.3.3", "Gingerbread MR1", 10),
    version("3.0", "Honeycomb", 11),
    version("3.1", "Honeycomb MR1", 12),
    version("3.2", "Honeycomb MR2", 13),
    version("4.0", "Ice Cream Sandwich", 14),
    version("4.0.3", "Ice Cream Sandwich MR1", 15),
    version("4.1", "Jelly Bean", 16),
    version("4.2", "Jelly Bean MR1", 17),
    version("4.3", "Jelly Bean MR2", 18),
    version("4.4", "KitKat", 19),
    version("4.4W", "KitKat Watch", 20),
    version("5.0", "Lollipop", 21),
    version("5.1", "Lollipop MR1", 22),
    version("6.0", "Marshmallow", 23),
    version("7.0", "Nougat", 24),
    version("7.1", "Nougat MR1", 25),
    version("8.0", "Oreo", 26),
    version("8.1", "Oreo MR1", 27),
    version("9", "Pie", 28),
    version("10", "Q", 29),
    version("11", "R", 30),
    version("12", "S", 31),
    version("13", "Sv2", 32),
    version("14", "Tiramisu", 33),
];

impl AndroidVersion {
    pub fn all() -> &'static [AndroidVersion] {
        VERSIONS
    }

    /// First letter of the version name (`"T"` for Tiramisu).
    pub fn version_short(&self) -> &'static str {
        let end = self
            .version_name
            .char_indices()
            .nth(1)
            .map_or(self.version_name.len(), |(index, _)| index);
        &self.version_name[..end]
    }

    pub fn from_version_code(version_code: &str) -> Option<&'static AndroidVersion> {
        VERSIONS.iter().find(|v| v.version_code == version_code)
    }

    pub fn from_version_name(version_name: &str) -> Option<&'static AndroidVersion> {
        VERSIONS.iter().find(|v| v.version_name == version_name)
    }

    pub fn from_api_level(api_level: u32) -> Option<&'static AndroidVersion> {
        VERSIONS.iter().find(|v| v.api_level == api_level)
    }

    pub fn from_version_short(version_short: &str) -> Option<&'static AndroidVersion> {
        VERSIONS.iter().find(|v| v.version_short() == version_short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let tiramisu = AndroidVersion::from_api_level(33).unwrap();
        assert_eq!(tiramisu.version_code, "14");
        assert_eq!(tiramisu.version_short(), "T");
        assert_eq!(AndroidVersion::from_version_code("14"), Some(tiramisu));
        assert_eq!(AndroidVersion::from_version_name("Pie").unwrap().api_level, 28);
        assert_eq!(AndroidVersion::from_version_short("Q").unwrap().api_level, 29);
        assert!(AndroidVersion::from_api_level(99).is_none());
    }

    #[test]
    fn short_name_returns_first_match() {
        // 1.0, 1.1 and 1.5 all start with "1"; the oldest wins.
        assert_eq!(AndroidVersion::from_version_short("1").unwrap().api_level, 1);
        assert_eq!(AndroidVersion::from_version_short("E").unwrap().version_name, "Eclair");
    }

    #[test]
    fn api_levels_are_sequential() {
        for (index, version) in AndroidVersion::all().iter().enumerate() {
            assert_eq!(version.api_level as usize, index + 1);
        }
    }
}
