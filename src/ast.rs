//! # Squiggly filter expressions - Abstract Syntax Tree
//!
//! This module defines the durable output of the filter compiler: immutable
//! selection nodes plus the names, functions, and arguments attached to them.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[name]** - The six field-name variants (exact, wildcard, regex,
//!   variable, any-shallow, any-deep)
//! - **[node]** - Selection nodes, function chains, and arguments
//! - **[operators]** - The canonical operator table used for desugaring
//!
//! ## Quick Start
//!
//! ```text
//! a.b.c,-d,e:trim[f,g]
//! ```
//!
//! This filter selects `c` beneath `a.b`, excludes `d`, and selects `f` and
//! `g` beneath `e` with `e`'s value passed through `trim`.
//!
//! ## Core Concepts
//!
//! ### Selection trees
//!
//! A filter compiles to an ordered list of [`SquigglyNode`]s, one per
//! top-level selection. Dotted paths become single-child chains, sibling
//! selections of the same name merge, and a level made up entirely of
//! exclusions receives an implicit base-view marker (see
//! [`BASE_VIEW`](crate::BASE_VIEW)).
//!
//! ### Function chains
//!
//! `field#upper:trim|truncate(10)` attaches `upper` to the matched key and
//! the `trim`/`truncate` pipeline to its value. Every stage receives the
//! [`Input`](node::ArgumentNode::Input) placeholder as its first parameter:
//! the value flowing out of the previous stage.
//!
//! ### Operator desugaring
//!
//! `price:f(1+2)` carries no operator nodes; `1+2` arrives as a function
//! chain calling `add(1, 2)`, so evaluators dispatch on names alone.

pub mod name;
pub mod node;
pub mod operators;
pub mod tokens;

pub use name::{RegexPattern, SquigglyName};
pub use node::{
    ArgumentNode, FunctionNode, IntRangeNode, LambdaNode, LambdaParameter, ParseContext,
    SquigglyNode,
};
pub use operators::BinaryOp;
pub use tokens::Token;
