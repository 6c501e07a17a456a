//! Property tests for local-to-remote path mapping.

use std::path::PathBuf;

use proptest::prelude::*;

use cmsync::domain::value_objects::{to_build_path, to_remote_path, PathMapError};
use cmsync::WatchRoot;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._-]{0,11}")
        .unwrap()
        .prop_filter("not a dot segment", |s| s != "." && s != "..")
}

fn relative_segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(segment(), 1..=5)
}

fn remote_dest() -> impl Strategy<Value = String> {
    (proptest::collection::vec(segment(), 0..=3), any::<bool>(), any::<bool>()).prop_map(
        |(parts, leading, trailing)| {
            let mut dest = parts.join("/");
            if leading {
                dest.insert(0, '/');
            }
            if trailing && !dest.is_empty() {
                dest.push('/');
            }
            dest
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The remote path is the destination joined with the local
    /// path's segments, with forward slashes and no empty segments.
    #[test]
    fn property_remote_path_joins_segments(
        segments in relative_segments(),
        dest in remote_dest(),
    ) {
        let root = WatchRoot::new("/work/src", dest.clone());
        let local: PathBuf = segments.iter().fold(PathBuf::from("/work/src"), |p, s| p.join(s));

        let remote = to_remote_path(&local, &root).unwrap();

        prop_assert!(!remote.contains('\\'));
        prop_assert!(!remote.contains("//"));
        prop_assert!(remote.ends_with(&segments.join("/")));
        prop_assert_eq!(remote.starts_with('/'), dest.starts_with('/'));
    }

    /// PROPERTY: Mapping is a pure function of its inputs.
    #[test]
    fn property_mapping_is_deterministic(
        segments in relative_segments(),
        dest in remote_dest(),
    ) {
        let root = WatchRoot::new("/work/src", dest);
        let local: PathBuf = segments.iter().fold(PathBuf::from("/work/src"), |p, s| p.join(s));

        prop_assert_eq!(to_remote_path(&local, &root), to_remote_path(&local, &root));
    }

    /// PROPERTY: `.` components and redundant separators in the local path
    /// do not change the result.
    #[test]
    fn property_curdir_components_are_ignored(
        segments in relative_segments(),
    ) {
        let root = WatchRoot::new("/work/src", "/site");
        let plain: PathBuf = segments.iter().fold(PathBuf::from("/work/src"), |p, s| p.join(s));
        let dotted = PathBuf::from(format!("/work/./src//{}", segments.join("/./")));

        prop_assert_eq!(
            to_remote_path(&plain, &root).unwrap(),
            to_remote_path(&dotted, &root).unwrap()
        );
    }

    /// PROPERTY: Build paths are relative and equal the joined segments.
    #[test]
    fn property_build_path_is_relative(
        segments in relative_segments(),
    ) {
        let src = PathBuf::from("/project/src");
        let local = segments.iter().fold(src.clone(), |p, s| p.join(s));

        prop_assert_eq!(to_build_path(&local, &src).unwrap(), segments.join("/"));
    }

    /// PROPERTY: Paths outside the watch root are rejected, never mapped.
    #[test]
    fn property_outside_root_is_rejected(
        segments in relative_segments(),
    ) {
        let root = WatchRoot::new("/work/src", "/site");
        let local: PathBuf = segments.iter().fold(PathBuf::from("/elsewhere"), |p, s| p.join(s));

        let result = to_remote_path(&local, &root);
        prop_assert!(
            matches!(result, Err(PathMapError::OutsideRoot { .. })),
            "expected OutsideRoot, got {:?}",
            result
        );
    }
}
