use std::fmt;

use crate::ast::name::{RegexPattern, SquigglyName};

/// Source position (line, column) attached to every compiled node.
///
/// Lines are 1-based, columns 0-based. Used for error messages and kept on
/// nodes for diagnostics; node equality ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    pub line: u32,
    pub column: u32,
}

impl ParseContext {
    pub fn new(line: u32, column: u32) -> Self {
        ParseContext { line, column }
    }
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A compiled selection node.
///
/// One node per selected name at a given depth. The synthetic root is never
/// exposed; [`SquigglyParser::parse`](crate::compiler::SquigglyParser::parse)
/// returns the root's children. Immutable after construction and safe to
/// share across threads.
#[derive(Debug, Clone)]
pub struct SquigglyNode {
    /// Source position of the selection
    pub context: ParseContext,

    /// The selected name (exact, wildcard, regex, variable, `*`, `**`)
    pub name: SquigglyName,

    /// Nested selections, in declaration order
    pub children: Vec<SquigglyNode>,

    /// Functions applied to the matched key
    pub key_functions: Vec<FunctionNode>,

    /// Functions applied to the matched value
    pub value_functions: Vec<FunctionNode>,

    /// Exclusion rather than inclusion (`-field`)
    pub negated: bool,

    /// A nested sub-selection with members was declared for this node;
    /// `field[]` sets `empty_nested` instead
    pub squiggly: bool,

    /// An explicit empty sub-selection (`field[]`) was declared; distinct
    /// from having no sub-selection at all
    pub empty_nested: bool,
}

impl SquigglyNode {
    /// The stable name-string used as this node's merge key.
    pub fn name(&self) -> &str {
        self.name.name()
    }
}

/// Structural equality; source positions are ignored so that equivalent
/// filters compare equal regardless of where their pieces appeared.
impl PartialEq for SquigglyNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.children == other.children
            && self.key_functions == other.key_functions
            && self.value_functions == other.value_functions
            && self.negated == other.negated
            && self.squiggly == other.squiggly
            && self.empty_nested == other.empty_nested
    }
}

/// One stage of a key or value function chain.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    /// Function name, resolved by an external registry at evaluation time
    pub name: String,

    /// Ordered parameters; chain stages carry an implicit leading
    /// [`ArgumentNode::Input`]
    pub parameters: Vec<ArgumentNode>,

    /// Short-circuit to null instead of invoking when the upstream value is
    /// null (`?:` / `?|` separator)
    pub ignore_nulls: bool,

    /// Source position of the call
    pub context: ParseContext,
}

/// Structural equality, ignoring source positions.
impl PartialEq for FunctionNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.ignore_nulls == other.ignore_nulls
    }
}

/// A function argument.
///
/// Operator expressions never appear directly: the parser desugars them into
/// a [`FunctionChain`](ArgumentNode::FunctionChain) carrying one call named
/// after the canonical operator, so downstream evaluators need no operator
/// dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentNode {
    Boolean(bool),
    Float(f32),
    Integer(i32),
    String(String),
    Regex(RegexPattern),

    /// Variable reference, resolved at evaluation time against a
    /// caller-supplied binding
    Variable(String),

    /// Integer range with optionally open ends
    IntRange(IntRangeNode),

    /// Ordered chain of function calls
    FunctionChain(Vec<FunctionNode>),

    Lambda(LambdaNode),

    /// Placeholder for the value flowing into this position from the
    /// pipeline; the implicit first parameter of chained functions
    Input,
}

/// An integer range argument, e.g. `[1:3]`, `[:5]`, `[$start:]`.
///
/// Endpoints are integer literals or variables.
#[derive(Debug, Clone, PartialEq)]
pub struct IntRangeNode {
    pub start: Option<Box<ArgumentNode>>,
    pub end: Option<Box<ArgumentNode>>,
}

/// A lambda argument, e.g. `(x, _) -> x.add(1)`.
///
/// The body is a synthetic call named
/// [`IDENTITY_FUNCTION`](crate::IDENTITY_FUNCTION) wrapping the lambda's
/// expression as its sole parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaNode {
    pub parameters: Vec<LambdaParameter>,
    pub body: Box<FunctionNode>,
}

/// A declared lambda parameter: a bound identifier or the `_` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaParameter {
    Named(String),
    Anonymous,
}
