// tests/analyzer_tests.rs

use squiggly::{BASE_VIEW, SquigglyNode, SquigglyParser};

fn compile(filter: &str) -> Vec<SquigglyNode> {
    SquigglyParser::new().parse(filter).unwrap().to_vec()
}

fn has_base(nodes: &[SquigglyNode]) -> bool {
    nodes.iter().any(|n| n.name() == BASE_VIEW)
}

fn child<'a>(nodes: &'a [SquigglyNode], name: &str) -> &'a SquigglyNode {
    nodes
        .iter()
        .find(|n| n.name() == name)
        .unwrap_or_else(|| panic!("no node named '{}'", name))
}

// ============================================================================
// Base View Injection
// ============================================================================

#[test]
fn test_all_negated_filter_gains_base_view() {
    let nodes = compile("-a,-b");
    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].negated);
    assert!(nodes[1].negated);

    let base = child(&nodes, BASE_VIEW);
    assert!(!base.negated);
    assert!(base.children.is_empty());
}

#[test]
fn test_single_negation_gains_base_view() {
    let nodes = compile("-a");
    assert_eq!(nodes.len(), 2);
    assert!(has_base(&nodes));
}

#[test]
fn test_mixed_selection_left_alone() {
    let nodes = compile("a,-b");
    assert_eq!(nodes.len(), 2);
    assert!(!has_base(&nodes));
}

#[test]
fn test_nested_all_negated_injects_locally() {
    let nodes = compile("a[-b,-c]");
    assert!(!has_base(&nodes));

    let a = child(&nodes, "a");
    assert_eq!(a.children.len(), 3);
    assert!(has_base(&a.children));
}

#[test]
fn test_nested_mixed_left_alone() {
    let nodes = compile("a[b,-c]");
    let a = child(&nodes, "a");
    assert!(!has_base(&a.children));
}

// ============================================================================
// Dotted-Path Propagation
// ============================================================================

#[test]
fn test_dotted_negation_marks_every_level() {
    let nodes = compile("-a.b.c");
    assert!(has_base(&nodes));

    let a = child(&nodes, "a");
    assert!(has_base(&a.children));

    let b = child(&a.children, "b");
    assert!(has_base(&b.children));
    assert!(child(&b.children, "c").negated);
}

#[test]
fn test_explicit_sibling_stops_propagation_at_top() {
    let nodes = compile("x,-a.b.c");
    assert!(!has_base(&nodes));

    let a = child(&nodes, "a");
    assert!(has_base(&a.children));
}

#[test]
fn test_bracketed_mention_stops_propagation() {
    // The bracketed form spells the level out explicitly, so the marker
    // stays below it.
    let nodes = compile("a[-b.c]");
    assert!(!has_base(&nodes));

    let a = child(&nodes, "a");
    let b = child(&a.children, "b");
    assert!(has_base(&b.children));
}

// ============================================================================
// Merge Semantics
// ============================================================================

#[test]
fn test_merge_is_order_independent() {
    assert_eq!(compile("a,a.b"), compile("a.b,a"));
    assert_eq!(compile("a:trim,a.b"), compile("a.b,a:trim"));
}

#[test]
fn test_duplicate_mentions_merge() {
    let nodes = compile("a[b],a[c]");
    assert_eq!(nodes.len(), 1);
    let a = &nodes[0];
    assert_eq!(a.children.len(), 2);
}

#[test]
fn test_first_mention_decides_negation() {
    // "a,-a" keeps the plain inclusion, so no base view appears.
    let nodes = compile("a,-a");
    assert_eq!(nodes.len(), 1);
    assert!(!nodes[0].negated);

    // "-a,a" keeps the exclusion, which makes the level all-negated.
    let nodes = compile("-a,a");
    assert_eq!(nodes.len(), 2);
    assert!(child(&nodes, "a").negated);
    assert!(has_base(&nodes));
}

#[test]
fn test_merged_chains_concatenate() {
    let nodes = compile("a:trim,a:upper");
    assert_eq!(nodes.len(), 1);
    let chain = &nodes[0].value_functions;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].name, "trim");
    assert_eq!(chain[1].name, "upper");
}
