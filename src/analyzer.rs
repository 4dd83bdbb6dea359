use crate::BASE_VIEW;
use crate::ast::name::SquigglyName;
use crate::builder::MutableNode;

/// Semantic pass over the built tree.
///
/// A selection level consisting solely of exclusions would otherwise select
/// nothing; this pass injects an implicit base-view reference next to the
/// exclusions so "everything except these" reads the way it was written.
/// The marker climbs through dotted-path ancestors, since a dotted segment
/// is shorthand for a level the author never saw, and stops at the first
/// level the author spelled out explicitly.
pub(crate) fn analyze(root: &mut MutableNode) {
    analyze_level(root);
}

/// Returns true when this node received a marker that should be considered
/// for propagation into its parent.
fn analyze_level(node: &mut MutableNode) -> bool {
    if node.children.is_empty() {
        return false;
    }

    if node.children.values().all(|child| child.negated) {
        inject_base_view(node);
        return true;
    }

    let mut bubbled = false;
    for child in node.children.values_mut() {
        if analyze_level(child) {
            bubbled = true;
        }
    }

    if bubbled && node.dot_pathed {
        inject_base_view(node);
        return true;
    }

    false
}

fn inject_base_view(node: &mut MutableNode) {
    let mut marker = MutableNode::new(node.context, SquigglyName::Exact(BASE_VIEW.to_string()));
    // Carries the parent's flag so injection never disturbs dotted-path
    // propagation.
    marker.dot_pathed = node.dot_pathed;
    node.add_child(marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn analyzed(filter: &str) -> MutableNode {
        let expressions = Parser::new(Lexer::new(filter)).unwrap().parse().unwrap();
        let mut root = build(&expressions);
        analyze(&mut root);
        root
    }

    #[test]
    fn test_all_negated_top_level_gains_base_view() {
        let root = analyzed("-a,-b");
        assert_eq!(root.children.len(), 3);
        assert!(root.children.contains_key(BASE_VIEW));
    }

    #[test]
    fn test_mixed_top_level_unchanged() {
        let root = analyzed("a,-b");
        assert!(!root.children.contains_key(BASE_VIEW));
    }

    #[test]
    fn test_nested_injection_stays_nested() {
        let root = analyzed("a[-b,-c]");
        assert!(!root.children.contains_key(BASE_VIEW));
        assert!(root.children["a"].children.contains_key(BASE_VIEW));
    }

    #[test]
    fn test_dotted_negation_climbs_to_top() {
        let root = analyzed("-a.b.c");
        let a = &root.children["a"];
        let b = &a.children["b"];
        assert!(b.children.contains_key(BASE_VIEW));
        assert!(a.children.contains_key(BASE_VIEW));
        assert!(root.children.contains_key(BASE_VIEW));
    }

    #[test]
    fn test_sibling_stops_climb_at_top() {
        let root = analyzed("x,-a.b.c");
        let a = &root.children["a"];
        assert!(a.children.contains_key(BASE_VIEW));
        assert!(!root.children.contains_key(BASE_VIEW));
    }
}
