pub mod ast;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod output;

mod analyzer;
mod builder;
mod parser;

pub use ast::{
    ArgumentNode, FunctionNode, IntRangeNode, LambdaNode, LambdaParameter, ParseContext,
    RegexPattern, SquigglyName, SquigglyNode,
};
pub use cache::{CacheSpec, CacheStats, FilterCache};
pub use compiler::SquigglyParser;
pub use error::{CacheSpecError, ParseError};
pub use lexer::Lexer;
pub use output::nodes_to_json;

/// Name of the implicit view injected next to all-negated selections.
pub const BASE_VIEW: &str = "base";

/// Name of the synthetic function wrapping a lambda body expression.
pub const IDENTITY_FUNCTION: &str = "identity";
