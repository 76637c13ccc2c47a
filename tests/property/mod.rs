//! Property-based testing for classfile-paths
//!
//! Uses proptest to check the allocation and shortening invariants across
//! randomly generated identifiers and names.

use ::classfile_paths::shorten::{shorten_path_component, utf8_len, SHORTEN_MARKER};
use ::classfile_paths::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Segments drawn from tiny alphabets so collisions are frequent: case
/// variants, literal `.N` and `#` forms, reserved names, and over-long
/// names that only differ where shortening cuts
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[aAbB]{1,3}".prop_map(|s| s),
        "[aA][aA.#23]{0,4}".prop_map(|s| s),
        "[a-zA-Z0-9_$]{1,12}".prop_map(|s| s),
        "[a-z\u{00e9}\u{00c9}\u{4e00}-\u{4e05}]{1,4}".prop_map(|s| s),
        prop_oneof![Just("con"), Just("CON"), Just("con#"), Just("Con#.2")].prop_map(String::from),
        "[xX]".prop_map(|mid| format!("{}{mid}{}", "p".repeat(150), "q".repeat(150))),
    ]
}

/// Identifiers with zero to three package segments
fn identifier_strategy() -> impl Strategy<Value = ClassIdentifier> {
    prop::collection::vec(segment_strategy(), 1..=4)
        .prop_map(|segments| ClassIdentifier::from_segments(segments).unwrap())
}

fn tree(case_sensitivity: CaseSensitivity, max_component_bytes: usize) -> PathTree {
    PathTreeBuilder::new()
        .probe(Arc::new(FixedProbe {
            case_sensitivity,
            rejects_reserved_names: true,
        }))
        .max_component_bytes(max_component_bytes)
        .build(PathBuf::from("/out"))
        .unwrap()
}

fn case_strategy() -> impl Strategy<Value = CaseSensitivity> {
    prop_oneof![
        Just(CaseSensitivity::Sensitive),
        Just(CaseSensitivity::Insensitive),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Distinct identifiers never share a path, and repeats are stable
    #[test]
    fn distinct_identifiers_get_distinct_paths(
        ids in prop::collection::vec(identifier_strategy(), 1..60),
        case_sensitivity in case_strategy(),
    ) {
        let tree = tree(case_sensitivity, 245);
        let mut by_path: HashMap<PathBuf, ClassIdentifier> = HashMap::new();
        let mut by_id: HashMap<ClassIdentifier, PathBuf> = HashMap::new();

        for id in &ids {
            let path = tree.allocate(id).unwrap();
            if let Some(previous) = by_id.get(id) {
                prop_assert_eq!(previous, &path);
            }
            if let Some(owner) = by_path.get(&path) {
                prop_assert_eq!(owner, id);
            }
            by_path.insert(path.clone(), id.clone());
            by_id.insert(id.clone(), path);
        }
    }

    /// On a case-insensitive volume, paths stay distinct after case folding
    #[test]
    fn insensitive_paths_distinct_after_folding(
        ids in prop::collection::vec(identifier_strategy(), 1..60),
    ) {
        let tree = tree(CaseSensitivity::Insensitive, 245);
        let mut by_folded: HashMap<String, ClassIdentifier> = HashMap::new();

        for id in &ids {
            let folded = tree.allocate(id).unwrap().to_string_lossy().to_lowercase();
            if let Some(owner) = by_folded.get(&folded) {
                prop_assert_eq!(owner, id);
            }
            by_folded.insert(folded, id.clone());
        }
    }

    /// Every allocated component fits the byte budget, suffixes included
    #[test]
    fn components_fit_budget(
        ids in prop::collection::vec(
            prop::collection::vec("[aA\u{00e9}\u{00c9}\u{4e00}-\u{4e02}\u{1f600}-\u{1f602}]{1,40}", 1..4),
            1..20,
        ),
        budget in 16usize..64,
        case_sensitivity in case_strategy(),
    ) {
        let tree = tree(case_sensitivity, budget);
        for segments in ids {
            let id = ClassIdentifier::from_segments(segments).unwrap();
            let path = tree.allocate(&id).unwrap();

            for component in path.strip_prefix("/out").unwrap().components() {
                let name = component.as_os_str().to_str().unwrap();
                prop_assert!(utf8_len(name) <= budget, "{} is {} bytes", name, utf8_len(name));
            }
        }
    }

    /// shorten(s, n) is at most len(s) - n bytes whenever n + 1 bytes can be removed
    #[test]
    fn shorten_meets_byte_budget(
        component in "[a-zA-Z\u{00e9}\u{20ac}\u{4e00}-\u{4e20}\u{1f600}-\u{1f610}]{1,60}",
        fraction in 0.0f64..1.0,
    ) {
        let len = utf8_len(&component);
        let n = ((len - 1) as f64 * fraction) as usize;
        let shortened = shorten_path_component(&component, n);

        prop_assert!(utf8_len(&shortened) <= len - n);
        prop_assert_eq!(shortened.matches(SHORTEN_MARKER).count(), 1);
        prop_assert_eq!(shorten_path_component(&component, n), shortened);
    }
}
