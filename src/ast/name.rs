use regex::{Regex, RegexBuilder};

use crate::ast::node::ParseContext;
use crate::error::ParseError;

/// A compiled regex literal: pattern source, flags, and the compiled form.
///
/// Equality compares the pattern source and flags only; the compiled regex is
/// derived state.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    pattern: String,
    case_insensitive: bool,
    compiled: Regex,
}

impl RegexPattern {
    /// Compile a pattern with its flag characters.
    ///
    /// The supported flag set is `i` (case-insensitive); any other flag
    /// character fails with [`ParseError::InvalidPatternFlag`].
    pub fn compile(pattern: &str, flags: &str, context: ParseContext) -> Result<Self, ParseError> {
        let mut case_insensitive = false;

        for flag in flags.chars() {
            match flag {
                'i' => case_insensitive = true,
                other => {
                    return Err(ParseError::InvalidPatternFlag {
                        context,
                        flag: other,
                        pattern: pattern.to_string(),
                    });
                }
            }
        }

        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| ParseError::Syntax {
                context,
                message: format!("invalid regex pattern: {}", e),
            })?;

        Ok(RegexPattern {
            pattern: pattern.to_string(),
            case_insensitive,
            compiled,
        })
    }

    /// The pattern source as written in the filter.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// The compiled regex, ready for matching by the filtering consumer.
    pub fn regex(&self) -> &Regex {
        &self.compiled
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.case_insensitive == other.case_insensitive
    }
}

/// A field name in its six variants.
///
/// The compiler only classifies names; matching them against real field
/// names, and the precedence between variants that could match the same
/// field, belong to the filtering consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SquigglyName {
    /// Literal name
    Exact(String),

    /// Glob pattern containing `*`
    Wildcard(String),

    /// Regex literal
    Regex(RegexPattern),

    /// Variable reference, bound at evaluation time
    Variable(String),

    /// `*`: any single field at the current level
    AnyShallow,

    /// `**`: any field at any depth
    AnyDeep,
}

impl SquigglyName {
    /// The stable name-string used as the merge key among siblings.
    pub fn name(&self) -> &str {
        match self {
            SquigglyName::Exact(name) => name,
            SquigglyName::Wildcard(pattern) => pattern,
            SquigglyName::Regex(regex) => regex.pattern(),
            SquigglyName::Variable(name) => name,
            SquigglyName::AnyShallow => "*",
            SquigglyName::AnyDeep => "**",
        }
    }
}
