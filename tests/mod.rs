//! Main test module for classfile-paths
//!
//! This module includes all test suites:
//! - Integration tests for allocation scenarios through the public API
//! - Concurrency tests with many workers sharing one tree
//! - Property-based tests for uniqueness and shortening invariants

pub mod property;

#[cfg(test)]
mod edge_cases {
    use ::classfile_paths::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn fixed_tree(case_sensitivity: CaseSensitivity, reserved: bool) -> PathTree {
        PathTreeBuilder::new()
            .probe(Arc::new(FixedProbe {
                case_sensitivity,
                rejects_reserved_names: reserved,
            }))
            .build(PathBuf::from("/out"))
            .unwrap()
    }

    #[test]
    fn test_default_package_class() {
        let tree = fixed_tree(CaseSensitivity::Sensitive, false);
        assert_eq!(
            tree.allocate_descriptor("LMain;").unwrap(),
            PathBuf::from("/out/Main.smali")
        );
    }

    #[test]
    fn test_inner_class_names_kept_verbatim() {
        let tree = fixed_tree(CaseSensitivity::Sensitive, false);
        let outer = tree.allocate_descriptor("Lcom/a/Outer;").unwrap();
        let inner = tree.allocate_descriptor("Lcom/a/Outer$Inner;").unwrap();
        let anon = tree.allocate_descriptor("Lcom/a/Outer$1;").unwrap();
        assert!(outer.ends_with("Outer.smali"));
        assert!(inner.ends_with("Outer$Inner.smali"));
        assert!(anon.ends_with("Outer$1.smali"));
    }

    #[test]
    fn test_class_and_package_with_same_name_coexist() {
        // "a/B.smali" the file and "a/B/" the directory are different names
        let tree = fixed_tree(CaseSensitivity::Insensitive, false);
        let class = tree.allocate_descriptor("La/B;").unwrap();
        let nested = tree.allocate_descriptor("La/B/C;").unwrap();
        assert_eq!(class, PathBuf::from("/out/a/B.smali"));
        assert_eq!(nested, PathBuf::from("/out/a/B/C.smali"));
        assert_eq!(tree.stats().virtual_groups, 0);
    }

    #[test]
    fn test_empty_extension_class_beside_package() {
        let tree = PathTreeBuilder::new()
            .probe(Arc::new(FixedProbe {
                case_sensitivity: CaseSensitivity::Sensitive,
                rejects_reserved_names: false,
            }))
            .file_extension("")
            .build(PathBuf::from("/out"))
            .unwrap();

        let nested = tree.allocate_descriptor("La/b/C;").unwrap();
        let class = tree.allocate_descriptor("La/b;").unwrap();
        assert_eq!(nested, PathBuf::from("/out/a/b/C"));
        assert_eq!(class, PathBuf::from("/out/a/b.2"));
        assert_eq!(tree.allocate_descriptor("La/b;").unwrap(), class);
    }

    #[test]
    fn test_class_named_like_package_with_extension() {
        let tree = fixed_tree(CaseSensitivity::Insensitive, false);
        let nested = tree.allocate_descriptor("La/Foo.smali/X;").unwrap();
        let class = tree.allocate_descriptor("La/Foo;").unwrap();
        assert_eq!(nested, PathBuf::from("/out/a/Foo.smali/X.smali"));
        assert_eq!(class, PathBuf::from("/out/a/Foo.2.smali"));
    }

    #[test]
    fn test_literal_name_matching_a_suffix() {
        let tree = fixed_tree(CaseSensitivity::Insensitive, false);
        let first = tree.allocate_descriptor("La/Foo;").unwrap();
        let second = tree.allocate_descriptor("La/foo;").unwrap();
        let literal = tree.allocate_descriptor("La/foo.2;").unwrap();

        assert_eq!(first, PathBuf::from("/out/a/Foo.smali"));
        assert_eq!(second, PathBuf::from("/out/a/foo.2.smali"));
        assert_eq!(literal, PathBuf::from("/out/a/foo.2.2.smali"));
    }

    #[test]
    fn test_escaped_name_and_literal_marker() {
        let tree = fixed_tree(CaseSensitivity::Sensitive, true);
        let escaped = tree.allocate_descriptor("La/con;").unwrap();
        let literal = tree.allocate_descriptor("La/con#;").unwrap();

        assert_eq!(escaped, PathBuf::from("/out/a/con#.smali"));
        assert_eq!(literal, PathBuf::from("/out/a/con#.2.smali"));
    }

    #[test]
    fn test_long_names_differing_in_the_middle() {
        let tree = fixed_tree(CaseSensitivity::Insensitive, false);
        let left = format!("La/{}X{};", "p".repeat(150), "q".repeat(150));
        let right = format!("La/{}Y{};", "p".repeat(150), "q".repeat(150));

        let a = tree.allocate_descriptor(&left).unwrap();
        let b = tree.allocate_descriptor(&right).unwrap();
        assert_ne!(a, b);
        assert_eq!(tree.allocate_descriptor(&left).unwrap(), a);
        assert_eq!(tree.allocate_descriptor(&right).unwrap(), b);
    }

    #[test]
    fn test_unicode_segments() {
        let tree = fixed_tree(CaseSensitivity::Insensitive, false);
        let a = tree.allocate_descriptor("Lпакет/Класс;").unwrap();
        let b = tree.allocate_descriptor("Lпакет/класс;").unwrap();
        assert_eq!(a, PathBuf::from("/out/пакет/Класс.smali"));
        assert_eq!(b, PathBuf::from("/out/пакет/класс.2.smali"));
    }

    #[test]
    fn test_reserved_names_match_whole_segment_only() {
        let tree = fixed_tree(CaseSensitivity::Sensitive, true);
        assert_eq!(
            tree.allocate_descriptor("Lconsole/Com1;").unwrap(),
            PathBuf::from("/out/console/Com1#.smali")
        );
        assert_eq!(
            tree.allocate_descriptor("Lnul/Lpt10;").unwrap(),
            PathBuf::from("/out/nul#/Lpt10.smali")
        );
    }
}
