//! Ordering of file lists: files in subdirectories come before the files
//! of the directory holding them, everything else is plain collation.
//!
//! Collation is byte order, which is what `strcoll` gives under the C locale
//! that proprietary-files tooling runs with.

use std::borrow::Cow;
use std::cmp::Ordering;

/// Directory part of `path` including the trailing `/`.
///
/// A path without any `/` is treated as a directory of its own.
fn dir_of(path: &str) -> Cow<'_, str> {
    match path.rfind('/') {
        Some(index) => Cow::Borrowed(&path[..=index]),
        None => Cow::Owned(format!("{path}/")),
    }
}

/// Compare two paths, putting files of a deeper directory before files of
/// one of its ancestors.
pub fn cmp_files(a: &str, b: &str) -> Ordering {
    if a.is_empty() || b.is_empty() {
        return a.cmp(b);
    }

    if !a.contains('/') && !b.contains('/') {
        return a.cmp(b);
    }

    let a_dir = dir_of(a);
    let b_dir = dir_of(b);

    if a_dir == b_dir {
        a.cmp(b)
    } else if a_dir.starts_with(b_dir.as_ref()) {
        Ordering::Less
    } else if b_dir.starts_with(a_dir.as_ref()) {
        Ordering::Greater
    } else {
        a.cmp(b)
    }
}

/// Like [`cmp_files`], ignoring the leading `-` that marks entries which
/// are built from source instead of copied.
pub fn cmp_proprietary_files(a: &str, b: &str) -> Ordering {
    cmp_files(
        a.strip_prefix('-').unwrap_or(a),
        b.strip_prefix('-').unwrap_or(b),
    )
}

pub fn sort_files<T: AsRef<str>>(files: &mut [T]) {
    merge_sort_by(files, |a, b| cmp_files(a.as_ref(), b.as_ref()));
}

pub fn sort_proprietary_files<T: AsRef<str>>(files: &mut [T]) {
    merge_sort_by(files, |a, b| cmp_proprietary_files(a.as_ref(), b.as_ref()));
}

/// Stable bottom-up merge sort.
///
/// [`cmp_files`] is not transitive when bare names and paths are mixed
/// (`a/b/c` < `a` < `a-` < `a/b/c`), which `slice::sort_by` may reject with
/// a panic. Merging never looks at more than two runs at a time, so any
/// comparator yields some permutation.
fn merge_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    let mut order: Vec<usize> = (0..len).collect();
    let mut merged = order.clone();

    let mut width = 1;
    while width < len {
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);

            for slot in &mut merged[start..end] {
                let take_left = right >= end
                    || (left < mid
                        && compare(&items[order[left]], &items[order[right]]) != Ordering::Greater);
                if take_left {
                    *slot = order[left];
                    left += 1;
                } else {
                    *slot = order[right];
                    right += 1;
                }
            }
        }
        std::mem::swap(&mut order, &mut merged);
        width *= 2;
    }

    // order[i] is the original index of the item that belongs at i.
    for i in 0..len {
        let mut source = order[i];
        while source < i {
            source = order[source];
        }
        items.swap(i, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdirectory_before_parent() {
        assert_eq!(cmp_files("a/b/file1", "a/file2"), Ordering::Less);
        assert_eq!(cmp_files("a/file2", "a/b/file1"), Ordering::Greater);
    }

    #[test]
    fn siblings_and_unrelated_use_collation() {
        assert_eq!(cmp_files("a/b", "a/c"), Ordering::Less);
        assert_eq!(cmp_files("a/x/1", "b/y/2"), Ordering::Less);
        assert_eq!(cmp_files("foo", "bar"), Ordering::Greater);
        assert_eq!(cmp_files("", "a/b"), Ordering::Less);
        assert_eq!(cmp_files("Z", "a"), Ordering::Less);
    }

    #[test]
    fn bare_name_acts_as_directory() {
        // "a" is treated as the directory "a/", which is an ancestor of "a/b/".
        assert_eq!(cmp_files("a/b/c", "a"), Ordering::Less);
        assert_eq!(cmp_files("a", "a/z"), Ordering::Less);
    }

    #[test]
    fn sorts_file_list() {
        let mut files = vec![
            "vendor/lib/libfoo.so",
            "vendor/etc/init/foo.rc",
            "vendor/build.prop",
            "vendor/lib/hw/foo.default.so",
            "vendor/bin/foo",
        ];
        sort_files(&mut files);

        assert_eq!(
            files,
            [
                "vendor/bin/foo",
                "vendor/etc/init/foo.rc",
                "vendor/lib/hw/foo.default.so",
                "vendor/lib/libfoo.so",
                "vendor/build.prop",
            ]
        );
    }

    #[test]
    fn mixed_bare_names_and_paths_sort_without_panicking() {
        assert_eq!(cmp_files("a/b/c", "a"), Ordering::Less);
        assert_eq!(cmp_files("a", "a-"), Ordering::Less);
        assert_eq!(cmp_files("a-", "a/b/c"), Ordering::Less);

        let mut files: Vec<String> = vec!["a".into(), "a-".into(), "a/b/c".into()];
        for i in 0..200 {
            files.push(format!("d{i}"));
            files.push(format!("d{i}-"));
            files.push(format!("d{i}/e/f"));
            files.push(format!("-d{i}/e/g"));
        }
        let mut expected = files.clone();
        expected.sort();

        sort_files(&mut files);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(sorted, expected);

        sort_proprietary_files(&mut files);
        assert_eq!(files.len(), expected.len());
    }

    #[test]
    fn sort_is_stable_for_marked_duplicates() {
        let mut files = vec![
            "vendor/lib/a.so",
            "-vendor/lib/a.so",
            "vendor/etc/a.xml",
            "-vendor/etc/a.xml",
        ];
        sort_proprietary_files(&mut files);
        assert_eq!(
            files,
            ["vendor/etc/a.xml", "-vendor/etc/a.xml", "vendor/lib/a.so", "-vendor/lib/a.so"]
        );
    }

    #[test]
    fn proprietary_marker_is_ignored() {
        assert_eq!(
            cmp_proprietary_files("-vendor/app/Foo/Foo.apk", "vendor/app/Bar/Bar.apk"),
            Ordering::Greater
        );

        let mut files = vec!["vendor/lib/b.so", "-vendor/lib/a.so", "vendor/lib/c.so"];
        sort_proprietary_files(&mut files);
        assert_eq!(files, ["-vendor/lib/a.so", "vendor/lib/b.so", "vendor/lib/c.so"]);
    }
}
