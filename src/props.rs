//! Android build prop store.
//!
//! Mimics the Android property system: `getprop`/`setprop` style access over
//! a string-to-string map, with typed getters that fall back to a default
//! when a value is missing or cannot be converted.

use crate::Error;
use camino::Utf8Path;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::str::FromStr;
use tracing::debug;

/// Partitions that carry their own `ro.<partition>.*` props.
pub const PARTITIONS: [&str; 8] = [
    "bootimage",
    "odm",
    "odm_dlkm",
    "product",
    "system",
    "system_ext",
    "vendor",
    "vendor_dlkm",
];

/// Key/value property store backed by a sorted map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProp {
    props: BTreeMap<String, String>,
}

impl BuildProp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a prop file.
    pub fn from_file<P: AsRef<Utf8Path>>(path: P) -> Result<Self, Error> {
        let mut build_prop = Self::new();
        build_prop.import_file(path)?;
        Ok(build_prop)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_parsed(key).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get_parsed(key).unwrap_or(default)
    }

    /// Parse a value with [`FromStr`], ignoring surrounding whitespace.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Import `key=value` lines.
    ///
    /// Empty lines, `#` comments and lines without `=` are skipped. Only the
    /// first `=` splits the line, so values may contain `=`.
    pub fn import_str(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => self.set(key, value),
                None => debug!("Skipping prop line without '=': {:?}", line),
            }
        }
    }

    /// Import the serialized form of another store.
    pub fn import_props(&mut self, other: &BuildProp) {
        self.import_str(&other.to_string());
    }

    pub fn import_file<P: AsRef<Utf8Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("Importing props from {}", path);
        self.import_str(&text);
        Ok(())
    }

    /// All props sorted by key, one `key=value` per line, with a trailing
    /// newline. Keys listed in `excluded` are left out.
    pub fn readable_list(&self, excluded: &[&str]) -> String {
        let lines: Vec<String> = self
            .props
            .iter()
            .filter(|(key, _)| !excluded.contains(&key.as_str()))
            .map(|(key, value)| format!("{key}={value}"))
            .collect();

        lines.join("\n") + "\n"
    }

    pub fn write_to_file<P: AsRef<Utf8Path>>(&self, path: P, excluded: &[&str]) -> Result<(), Error> {
        fs::write(path.as_ref(), self.readable_list(excluded))?;
        Ok(())
    }
}

impl fmt::Display for BuildProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readable_list(&[]))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildProp {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut build_prop = Self::new();
        for (key, value) in iter {
            build_prop.set(key, value);
        }
        build_prop
    }
}

/// Permissive boolean token parser (`1/0`, `yes/no`, `true/false`, `on/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Expand a prop name template for every partition.
///
/// With `add_empty`, the template must omit the dot after the partition
/// (`"ro.{}build.date"`) and an extra, partition-less name is appended.
pub fn partition_props(template: &str, add_empty: bool) -> Vec<String> {
    let mut props: Vec<String> = PARTITIONS
        .iter()
        .map(|partition| {
            if add_empty {
                template.replacen("{}", &format!("{partition}."), 1)
            } else {
                template.replacen("{}", partition, 1)
            }
        })
        .collect();

    if add_empty {
        props.push(template.replacen("{}", "", 1));
    }

    props
}

/// Turn a build fingerprint into a build description.
///
/// `brand/product/device:version/id/number:variant/tags` becomes
/// `product-variant version id number tags`.
pub fn fingerprint_to_description(fingerprint: &str) -> Result<String, Error> {
    let invalid = || Error::InvalidFingerprint(fingerprint.to_string());

    let (_brand, rest) = fingerprint.split_once('/').ok_or_else(invalid)?;
    let (product, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let (_device, rest) = rest.split_once(':').ok_or_else(invalid)?;
    let (platform_version, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let (build_id, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let (build_number, rest) = rest.split_once(':').ok_or_else(invalid)?;
    let (build_variant, build_tags) = rest.split_once('/').ok_or_else(invalid)?;

    Ok(format!(
        "{product}-{build_variant} {platform_version} {build_id} {build_number} {build_tags}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# begin build properties
ro.product.device=foo
ro.build.display.id=foo-user 14 UP1A.231005.007 eng.=test
ro.build.ab_update=true

not a prop
ro.sf.lcd_density= 440
ro.vendor.float=1.5
";

    #[test]
    fn import_skips_comments_and_junk() {
        let mut props = BuildProp::new();
        props.import_str(SAMPLE);

        assert_eq!(props.len(), 5);
        assert_eq!(props.get("ro.product.device"), Some("foo"));
        assert_eq!(props.get("not a prop"), None);
    }

    #[test]
    fn splits_on_first_equals() {
        let mut props = BuildProp::new();
        props.import_str("key=value=with=equals\n=empty.key\n");

        assert_eq!(props.get("key"), Some("value=with=equals"));
        assert_eq!(props.get(""), Some("empty.key"));
    }

    #[test]
    fn last_write_wins() {
        let mut props = BuildProp::new();
        props.import_str("a=1\na=2\n");
        props.set("b", "x");
        props.set("b", "y");

        assert_eq!(props.get("a"), Some("2"));
        assert_eq!(props.get("b"), Some("y"));
    }

    #[test]
    fn typed_getters_fall_back_to_default() {
        let mut props = BuildProp::new();
        props.import_str(SAMPLE);
        props.set("ro.bad.bool", "maybe");
        props.set("ro.bad.int", "12abc");

        assert!(props.get_bool("ro.build.ab_update", false));
        assert!(props.get_bool("ro.bad.bool", true));
        assert!(!props.get_bool("ro.missing", false));
        assert_eq!(props.get_int("ro.sf.lcd_density", 0), 440);
        assert_eq!(props.get_int("ro.bad.int", -1), -1);
        assert_eq!(props.get_float("ro.vendor.float", 0.0), 1.5);
        assert_eq!(props.get_float("ro.missing", 2.5), 2.5);
        assert_eq!(props.get_or("ro.missing", "fallback"), "fallback");
    }

    #[test]
    fn bool_tokens() {
        for token in ["1", "yes", "TRUE", "On", "y", "t"] {
            assert_eq!(parse_bool(token), Some(true), "{token}");
        }
        for token in ["0", "no", "False", "OFF", "n", "f"] {
            assert_eq!(parse_bool(token), Some(false), "{token}");
        }
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn readable_list_is_sorted_and_filtered() {
        let mut props = BuildProp::new();
        props.set("z.key", "1");
        props.set("a.key", "2");
        props.set("m.key", "3");

        assert_eq!(props.to_string(), "a.key=2\nm.key=3\nz.key=1\n");
        assert_eq!(props.readable_list(&["m.key"]), "a.key=2\nz.key=1\n");
    }

    #[test]
    fn serialized_form_is_a_fixed_point() {
        let mut props = BuildProp::new();
        props.import_str(SAMPLE);
        let first = props.to_string();

        let mut reimported = BuildProp::new();
        reimported.import_str(&first);

        assert_eq!(reimported, props);
        assert_eq!(reimported.to_string(), first);
    }

    #[test]
    fn import_props_merges_other_store() {
        let mut base: BuildProp = [("a", "1"), ("b", "1")].into_iter().collect();
        let other: BuildProp = [("b", "2"), ("c", "3")].into_iter().collect();
        base.import_props(&other);

        assert_eq!(base.to_string(), "a=1\nb=2\nc=3\n");
    }

    #[test]
    fn expands_partition_props() {
        let props = partition_props("ro.product.{}device", true);
        assert_eq!(props.len(), PARTITIONS.len() + 1);
        assert_eq!(props[0], "ro.product.bootimage.device");
        assert_eq!(props.last().map(String::as_str), Some("ro.product.device"));

        let props = partition_props("ro.{}.build.date", false);
        assert_eq!(props[6], "ro.vendor.build.date");
    }

    #[test]
    fn fingerprint_description() {
        let description = fingerprint_to_description(
            "google/oriole/oriole:14/UP1A.231005.007/10754064:user/release-keys",
        )
        .unwrap();
        assert_eq!(
            description,
            "oriole-user 14 UP1A.231005.007 10754064 release-keys"
        );

        assert!(matches!(
            fingerprint_to_description("garbage"),
            Err(Error::InvalidFingerprint(_))
        ));
    }
}
