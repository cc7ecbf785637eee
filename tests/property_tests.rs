//! Property-based tests for rust_domain_logger using proptest

use proptest::prelude::*;
use rust_domain_logger::core::{ConfigurationTree, LogValue, NodeId};
use rust_domain_logger::prelude::*;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), use_lower in any::<bool>()) {
        let text = if use_lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        let parsed: LogLevel = text.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that the enabled check follows the level order
    #[test]
    fn test_enabled_follows_order(max in any_level(), level in any_level()) {
        let registry = DomainRegistry::new();
        let domain = registry.domain(".levels").unwrap();
        domain.set_max_level(max);
        prop_assert_eq!(domain.is_enabled(level), level <= max);
    }
}

// ============================================================================
// Configuration Tree Tests
// ============================================================================

proptest! {
    /// Test that looking a name up twice yields the same node and creates nothing
    #[test]
    fn test_lookup_is_idempotent(names in prop::collection::vec(segment(), 1..20)) {
        let mut tree = ConfigurationTree::new();
        let first: Vec<NodeId> = names
            .iter()
            .map(|name| tree.lookup_or_create_child(NodeId::ROOT, name).unwrap())
            .collect();
        let size = tree.len();

        for (name, id) in names.iter().zip(&first) {
            prop_assert_eq!(tree.lookup_or_create_child(NodeId::ROOT, name).unwrap(), *id);
        }
        prop_assert_eq!(tree.len(), size);
    }

    /// Test that children stay ordered by descending name length
    #[test]
    fn test_children_ordered_by_length(names in prop::collection::vec(segment(), 1..30)) {
        let mut tree = ConfigurationTree::new();
        for name in &names {
            tree.lookup_or_create_child(NodeId::ROOT, name).unwrap();
        }

        let lengths: Vec<usize> = tree
            .node(NodeId::ROOT)
            .children()
            .iter()
            .map(|&child| tree.node(child).name().len())
            .collect();
        prop_assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(lengths.len(), unique.len());
    }

    /// Test that the maximum name length covers every full name
    #[test]
    fn test_max_name_length_covers_all(path in prop::collection::vec(segment(), 1..6)) {
        let mut tree = ConfigurationTree::new();
        let id = tree.resolve_by_dotted_name(NodeId::ROOT, &path.join(".")).unwrap();

        let full_name = tree.node(id).full_name().to_string();
        prop_assert_eq!(&full_name, &format!(".{}", path.join(".")));
        prop_assert!(tree.ids().all(|id| tree.node(id).full_name().len() <= tree.max_name_length()));
    }

    /// Test that a cascading setter never touches ancestors or siblings
    #[test]
    fn test_cascade_only_reaches_subtree(
        path in prop::collection::vec(segment(), 2..6),
        depth in 0usize..5,
        level in any_level(),
    ) {
        let registry = DomainRegistry::new();
        registry.domain(&format!(".{}", path.join("."))).unwrap();
        registry.domain(".zz_sibling").unwrap();

        let depth = depth % path.len();
        let target = format!(".{}", path[..=depth].join("."));
        registry.domain(&target).unwrap().set_max_level(level);

        for end in 1..=path.len() {
            let name = format!(".{}", path[..end].join("."));
            let expected = if end > depth { level } else { LogLevel::default() };
            prop_assert_eq!(registry.domain(&name).unwrap().max_level(), expected);
        }
        prop_assert_eq!(registry.root().max_level(), LogLevel::default());
        prop_assert_eq!(registry.domain(".zz_sibling").unwrap().max_level(), LogLevel::default());
    }

    /// Test that the directory part of a source path becomes the namespace
    #[test]
    fn test_path_namespace(directories in prop::collection::vec(segment(), 0..5), file in segment()) {
        let registry = DomainRegistry::builder().path_prefix("/work/src").build();
        let path = format!("/work/src/{}{}.rs",
            directories.iter().map(|d| format!("{}/", d)).collect::<String>(),
            file);

        let domain = registry.configuration_for(&path, None).unwrap();
        let expected = if directories.is_empty() {
            ".".to_string()
        } else {
            format!(".{}", directories.join("."))
        };
        prop_assert_eq!(domain.full_name(), expected);
    }
}

// ============================================================================
// Output Tests
// ============================================================================

proptest! {
    /// Test that continuation lines start under the first payload column
    #[test]
    fn test_continuation_lines_aligned(lines in prop::collection::vec("[a-z ]{1,20}", 1..6)) {
        let sink = Arc::new(MemorySink::new());
        let registry = DomainRegistry::builder().root_sink(sink.clone()).build();
        let site = CallSite::new("prop", "check", "p.rs", 1);

        let message = lines.join("\n");
        emit(registry.root(), &site, LogLevel::Debug, &[LogValue::Text(message.as_str().into())]);

        let prefix = "prop::check >> ";
        let out = sink.contents();
        let written: Vec<&str> = out.lines().collect();
        prop_assert_eq!(written.len(), lines.len());
        prop_assert_eq!(written[0], format!("{}{}", prefix, lines[0]));
        for (written, line) in written.iter().zip(&lines).skip(1) {
            prop_assert_eq!(*written, format!("{}{}", " ".repeat(prefix.len()), line));
        }
    }
}
