//! Property tests for hash comparison

use acsync_core::{OperationKind, compare_hashes};
use proptest::prelude::*;

fn hash() -> impl Strategy<Value = String> {
    "[0-9a-f]{4}".prop_map(|h| format!("sha256:{h}"))
}

proptest! {
    #[test]
    fn never_yields_delete(
        source in proptest::option::of(hash()),
        target in proptest::option::of(hash()),
        manifest in proptest::option::of(hash()),
    ) {
        let result = compare_hashes(source.as_deref(), target.as_deref(), manifest.as_deref());
        prop_assert_ne!(result.kind, OperationKind::Delete);
    }

    #[test]
    fn missing_source_is_always_skipped(
        target in proptest::option::of(hash()),
        manifest in proptest::option::of(hash()),
    ) {
        let result = compare_hashes(None, target.as_deref(), manifest.as_deref());
        prop_assert_eq!(result.kind, OperationKind::Skip);
    }

    #[test]
    fn missing_target_is_always_created(
        source in hash(),
        manifest in proptest::option::of(hash()),
    ) {
        let result = compare_hashes(Some(&source), None, manifest.as_deref());
        prop_assert_eq!(result.kind, OperationKind::Create);
    }

    #[test]
    fn equal_hashes_skip_whatever_the_manifest_says(
        source in hash(),
        manifest in proptest::option::of(hash()),
    ) {
        let result = compare_hashes(Some(&source), Some(&source), manifest.as_deref());
        prop_assert_eq!(result.kind, OperationKind::Skip);
    }

    #[test]
    fn differing_hashes_update(
        source in hash(),
        target in hash(),
        manifest in proptest::option::of(hash()),
    ) {
        prop_assume!(source != target);
        let result = compare_hashes(Some(&source), Some(&target), manifest.as_deref());
        prop_assert_eq!(result.kind, OperationKind::Update);
    }
}
