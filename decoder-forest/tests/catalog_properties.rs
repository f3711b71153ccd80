//! Integration tests: catalog construction rules and the traversal contract
//! the matching engine relies on.

use decoder_forest::{
    load_definitions, CatalogError, CatalogHandle, DecoderCatalog, DecoderDefinition, ErrorKind,
    LoaderConfig, OffsetPolicy,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn regex(name: &str) -> DecoderDefinition {
    DecoderDefinition::new(name).with_regex(true)
}

#[test]
fn test_unique_roots_keep_declaration_order() {
    init_logging();
    let names = ["sshd", "su", "sudo", "pam", "kernel", "json"];
    let mut catalog = DecoderCatalog::new();
    for name in names {
        catalog.attach(DecoderDefinition::new(name)).unwrap();
    }

    assert_eq!(catalog.lookup(false).names(), names.to_vec());
    assert!(catalog.lookup(true).is_empty());
}

#[test]
fn test_parent_must_exist_before_child() {
    init_logging();
    let mut catalog = DecoderCatalog::new();

    let err = catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownParent(ref p) if p == "sshd"));

    // Declaring the parent afterwards does not retroactively fix the order
    catalog.attach(regex("sshd")).unwrap();
    assert!(catalog.lookup(false).first().unwrap().children().is_empty());
}

#[test]
fn test_same_parent_regex_alternates() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("sshd")).unwrap();
    catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap();
    catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap();

    let children = catalog.lookup(false).first().unwrap().children();
    assert_eq!(children.len(), 2);
    assert!(children.get(0).unwrap().has_next_alternate());
    assert!(!children.get(1).unwrap().has_next_alternate());
}

#[test]
fn test_child_prematch_on_shared_name_is_rejected() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("sshd")).unwrap();
    catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap();

    let err = catalog
        .attach(regex("sshd-fail").with_parent("sshd").with_prematch(true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MultipleDefinitionsConflict);
    assert_eq!(err.decoder_name(), "sshd-fail");

    let children = catalog.lookup(false).first().unwrap().children();
    assert_eq!(children.len(), 1);
    assert!(!children.get(0).unwrap().has_next_alternate());
}

#[test]
fn test_offset_anchor_cannot_open_a_list() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    let chained = regex("A").with_offset_policy(OffsetPolicy::AfterPrevRegex);

    // Root list
    let err = catalog.attach(chained.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOffsetAnchor);

    // Child list
    catalog.attach(regex("P")).unwrap();
    let err = catalog.attach(chained.with_parent("P")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOffsetAnchor);
    assert!(catalog.lookup(false).first().unwrap().children().is_empty());
}

#[test]
fn test_sshd_scenario() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("sshd")).unwrap();
    catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap();

    let roots = catalog.lookup(false);
    assert_eq!(roots.names(), vec!["sshd"]);
    let sshd = roots.first().unwrap();
    assert_eq!(sshd.children().names(), vec!["sshd-fail"]);
    assert!(catalog.lookup(true).is_empty());
}

#[test]
fn test_root_regex_alternates() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("A")).unwrap();
    catalog.attach(regex("A")).unwrap();

    let roots = catalog.lookup(false);
    assert_eq!(roots.len(), 2);
    assert!(roots.get(0).unwrap().has_next_alternate());
    assert!(!roots.get(1).unwrap().has_next_alternate());
}

#[test]
fn test_root_prematch_duplicate_is_rejected() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    let def = DecoderDefinition::new("A").with_prematch(true);
    catalog.attach(def.clone()).unwrap();

    let err = catalog.attach(def).unwrap_err();
    assert!(matches!(err, CatalogError::MultipleDefinitionsConflict(ref n) if n == "A"));
    assert_eq!(catalog.lookup(false).len(), 1);
}

#[test]
fn test_grandchild_parent_reference_is_unknown() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("sshd")).unwrap();
    catalog.attach(regex("sshd-fail").with_parent("sshd")).unwrap();

    let err = catalog
        .attach(regex("sshd-fail-detail").with_parent("sshd-fail"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownParent);
}

#[test]
fn test_child_attaches_under_roots_of_both_forests() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("syslog").with_program_name(true)).unwrap();
    catalog.attach(regex("syslog")).unwrap();
    catalog.attach(regex("syslog-auth").with_parent("syslog")).unwrap();

    for has_program_name in [true, false] {
        let roots = catalog.lookup(has_program_name);
        assert_eq!(roots.first().unwrap().children().names(), vec!["syslog-auth"]);
    }
    assert_eq!(catalog.stats().total_nodes, 4);
}

#[test]
fn test_multi_parent_failure_keeps_earlier_attachments() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("P")).unwrap();
    // Only the unscoped P exists yet, so only it gets a plain "c"
    catalog.attach(DecoderDefinition::new("c").with_parent("P")).unwrap();
    catalog.attach(regex("P").with_program_name(true)).unwrap();

    // The scoped P is tried first and accepts; the unscoped P then rejects
    let err = catalog.attach(regex("c").with_parent("P")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateDecoderName);

    assert_eq!(catalog.lookup(true).first().unwrap().children().names(), vec!["c"]);
    let unscoped = catalog.lookup(false).first().unwrap().children();
    assert_eq!(unscoped.len(), 1);
    assert!(!unscoped.get(0).unwrap().has_next_alternate());
}

#[test]
fn test_alternates_follow_chain_across_unrelated_siblings() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("A").with_prematch(true)).unwrap();
    catalog.attach(regex("B")).unwrap();
    catalog
        .attach(regex("A").with_offset_policy(OffsetPolicy::AfterPrevRegex))
        .unwrap();
    catalog.attach(DecoderDefinition::new("A").with_external_matcher(true)).unwrap();

    let roots = catalog.lookup(false);
    let first = roots.first().unwrap();
    let chain: Vec<_> = first.alternates().map(|node| node.id()).collect();
    let expected: Vec<_> = roots.find("A").iter().map(|node| node.id()).collect();
    assert_eq!(chain, expected);
    assert_eq!(chain.len(), 3);

    // "B" has no alternates
    let b = roots.get(1).unwrap();
    assert_eq!(b.alternates().count(), 1);
}

#[test]
fn test_sibling_links_match_list_order() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    for name in ["a", "b", "c"] {
        catalog.attach(DecoderDefinition::new(name)).unwrap();
    }

    let roots = catalog.lookup(false);
    let mut walked = Vec::new();
    let mut cursor = roots.first();
    while let Some(node) = cursor {
        walked.push(node.name());
        cursor = node.next_sibling();
    }
    assert_eq!(walked, roots.names());
}

#[test]
fn test_shared_definition_under_multiple_parents() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    catalog.attach(regex("P").with_program_name(true)).unwrap();
    catalog.attach(regex("P")).unwrap();
    catalog.attach(regex("c").with_parent("P")).unwrap();
    catalog.attach(regex("c").with_parent("P")).unwrap();

    // Alternate flags are per node: each parent's first "c" is flagged
    for has_program_name in [true, false] {
        let children = catalog.lookup(has_program_name).first().unwrap().children();
        assert_eq!(children.len(), 2);
        assert!(children.get(0).unwrap().has_next_alternate());
    }
    assert_eq!(catalog.stats().alternate_links, 2);
}

#[test]
fn test_handle_reload_end_to_end() {
    init_logging();
    let handle = CatalogHandle::new();
    let definitions = vec![
        DecoderDefinition::new("sshd").with_program_name(true).with_prematch(true),
        regex("sshd-success").with_parent("sshd"),
        regex("sshd-fail").with_parent("sshd"),
        regex("json").with_external_matcher(true),
    ];

    let report = handle.reload(definitions.clone(), &LoaderConfig::new());
    assert!(report.is_success());
    assert_eq!(report.stats.total_nodes, 4);

    let mut broken = definitions;
    broken.push(DecoderDefinition::new("json").with_first_time_seen(true));
    let report = handle.reload(broken, &LoaderConfig::new().with_continue_on_error(true));
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].kind, ErrorKind::DuplicateFtsConflict);

    // The first load is still what readers see
    let catalog = handle.current();
    assert_eq!(catalog.lookup(true).first().unwrap().children().len(), 2);
    assert_eq!(catalog.lookup(false).names(), vec!["json"]);
}

#[test]
fn test_load_definitions_reuses_catalog() {
    init_logging();
    let mut catalog = DecoderCatalog::new();
    load_definitions(&mut catalog, vec![regex("a")], &LoaderConfig::new());
    assert!(catalog.is_published());

    let report = load_definitions(&mut catalog, vec![regex("b"), regex("c")], &LoaderConfig::new());
    assert!(report.is_success());
    assert_eq!(catalog.lookup(false).names(), vec!["b", "c"]);
}
