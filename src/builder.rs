use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::ast::name::SquigglyName;
use crate::ast::node::{FunctionNode, ParseContext, SquigglyNode};
use crate::parser::{FieldRef, FilterExpr, NestedSelection, Selector};

/// Working tree node used between parsing and freezing.
///
/// Children are keyed by their stable name-string so that repeated mentions
/// of the same name merge instead of duplicating; insertion order is the
/// declaration order the caller wrote.
#[derive(Debug, Clone)]
pub(crate) struct MutableNode {
    pub context: ParseContext,
    pub name: SquigglyName,
    pub children: IndexMap<String, MutableNode>,
    pub key_functions: Vec<FunctionNode>,
    pub value_functions: Vec<FunctionNode>,
    pub negated: bool,
    pub squiggly: bool,
    pub empty_nested: bool,

    /// Created by dotted-path desugaring. Cleared on any node that gains a
    /// non-dot-pathed child; drives base-view injection in the analyzer.
    pub dot_pathed: bool,
}

impl MutableNode {
    pub(crate) fn new(context: ParseContext, name: SquigglyName) -> Self {
        MutableNode {
            context,
            name,
            children: IndexMap::new(),
            key_functions: Vec::new(),
            value_functions: Vec::new(),
            negated: false,
            squiggly: false,
            empty_nested: false,
            dot_pathed: false,
        }
    }

    /// Adds `child`, merging into an existing child with the same name-string
    /// if one is present.
    pub(crate) fn add_child(&mut self, child: MutableNode) {
        let key = child.name.name().to_string();
        let slot = match self.children.entry(key) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.merge(child);
                existing
            }
            Entry::Vacant(entry) => entry.insert(child),
        };
        if !slot.dot_pathed {
            self.dot_pathed = false;
        }
    }

    /// Collision merge: sub-selections union, explicit-empty survives only
    /// when every mention was empty, and dot-pathing survives only when every
    /// mention was a dotted segment. The first mention's negation stands.
    /// Function chains concatenate in declaration order. Child maps merge
    /// recursively.
    fn merge(&mut self, other: MutableNode) {
        self.squiggly = self.squiggly || other.squiggly;
        self.empty_nested = self.empty_nested && other.empty_nested;
        self.dot_pathed = self.dot_pathed && other.dot_pathed;
        self.key_functions.extend(other.key_functions);
        self.value_functions.extend(other.value_functions);
        for (_, child) in other.children {
            self.add_child(child);
        }
    }

    /// Converts the working tree into the immutable form handed to callers.
    pub(crate) fn freeze(self) -> SquigglyNode {
        SquigglyNode {
            context: self.context,
            name: self.name,
            children: self
                .children
                .into_values()
                .map(MutableNode::freeze)
                .collect(),
            key_functions: self.key_functions,
            value_functions: self.value_functions,
            negated: self.negated,
            squiggly: self.squiggly,
            empty_nested: self.empty_nested,
        }
    }
}

/// Builds the merged working tree for a parsed expression list.
///
/// The returned node is a synthetic root; its children are the top-level
/// selections. The root starts dot-pathed so that a filter consisting solely
/// of dotted negations can surface a base-view marker at the top level.
pub(crate) fn build(expressions: &[FilterExpr]) -> MutableNode {
    let mut root = MutableNode::new(
        ParseContext::new(1, 0),
        SquigglyName::Exact("root".to_string()),
    );
    root.dot_pathed = true;

    for expression in expressions {
        for node in expression_to_nodes(expression) {
            root.add_child(node);
        }
    }

    root
}

/// Converts one expression into its node subtree(s). A field list produces
/// one subtree per listed field, each carrying a copy of the expression's
/// chains and nested selection.
fn expression_to_nodes(expression: &FilterExpr) -> Vec<MutableNode> {
    match &expression.selector {
        Selector::Field(field) => vec![terminal_node(field.clone(), expression, false)],

        Selector::List(fields) => fields
            .iter()
            .map(|field| terminal_node(field.clone(), expression, false))
            .collect(),

        Selector::Dotted(fields) => {
            // Desugar a.b.c into single-child nesting; every segment is
            // dot-pathed, the last carries the expression's payload.
            let (last, intermediates) = match fields.split_last() {
                Some(split) => split,
                None => return Vec::new(),
            };

            let mut node = terminal_node(last.clone(), expression, true);
            for field in intermediates.iter().rev() {
                let mut parent = MutableNode::new(field.context, field.name.clone());
                parent.dot_pathed = true;
                parent.squiggly = true;
                parent.add_child(node);
                node = parent;
            }
            vec![node]
        }
    }
}

/// The node that carries an expression's chains, negation, and nested
/// selection.
fn terminal_node(field: FieldRef, expression: &FilterExpr, dot_pathed: bool) -> MutableNode {
    let mut node = MutableNode::new(field.context, field.name);
    node.negated = expression.negated;
    node.dot_pathed = dot_pathed;
    node.key_functions = expression.key_functions.clone();
    node.value_functions = expression.value_functions.clone();

    match &expression.nested {
        NestedSelection::None => {}
        // `a[]` is its own shape, not a squiggly selection with no members.
        NestedSelection::Empty => {
            node.empty_nested = true;
        }
        NestedSelection::Selection(expressions) => {
            node.squiggly = true;
            for nested in expressions {
                for child in expression_to_nodes(nested) {
                    node.add_child(child);
                }
            }
        }
    }

    node
}
