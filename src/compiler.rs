use std::sync::Arc;

use crate::analyzer::analyze;
use crate::ast::node::SquigglyNode;
use crate::builder::build;
use crate::cache::{CacheSpec, CacheStats, FilterCache};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// The compilation entry point: filter text in, analyzed node list out.
///
/// Thread-safe and meant to be long-lived; results are memoized per source
/// text, so a parser shared behind an `Arc` serves concurrent callers with
/// one compilation per distinct filter.
pub struct SquigglyParser {
    cache: FilterCache,
}

impl SquigglyParser {
    pub fn new() -> Self {
        SquigglyParser::with_cache_spec(CacheSpec::default())
    }

    pub fn with_cache_spec(spec: CacheSpec) -> Self {
        SquigglyParser {
            cache: FilterCache::new(spec),
        }
    }

    /// Compiles a filter into its top-level selection nodes.
    ///
    /// Leading and trailing whitespace is ignored; a blank filter compiles
    /// to an empty node list rather than an error.
    pub fn parse(&self, filter: &str) -> Result<Arc<Vec<SquigglyNode>>, ParseError> {
        let filter = filter.trim();
        if filter.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        if let Some(nodes) = self.cache.get(filter)? {
            log::debug!("filter cache hit for '{}'", filter);
            return Ok(nodes);
        }

        let nodes = match compile(filter) {
            Ok(nodes) => Arc::new(nodes),
            Err(e) => {
                log::debug!("failed to compile filter '{}': {}", filter, e);
                return Err(e);
            }
        };
        log::debug!(
            "compiled filter '{}' into {} top-level nodes",
            filter,
            nodes.len()
        );
        self.cache.insert(filter.to_string(), Arc::clone(&nodes))?;
        Ok(nodes)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for SquigglyParser {
    fn default() -> Self {
        SquigglyParser::new()
    }
}

fn compile(filter: &str) -> Result<Vec<SquigglyNode>, ParseError> {
    let expressions = Parser::new(Lexer::new(filter))?.parse()?;
    let mut root = build(&expressions);
    analyze(&mut root);
    Ok(root.freeze().children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_compiles_to_nothing() {
        let parser = SquigglyParser::new();
        assert!(parser.parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_second_parse_hits_cache() {
        let parser = SquigglyParser::new();
        let first = parser.parse("a,b").unwrap();
        let second = parser.parse("a,b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.cache_stats().hits, 1);
    }

    #[test]
    fn test_whitespace_variants_share_entry() {
        let parser = SquigglyParser::new();
        let trimmed = parser.parse("a.b").unwrap();
        let padded = parser.parse("  a.b  ").unwrap();
        assert!(Arc::ptr_eq(&trimmed, &padded));
    }

    #[test]
    fn test_syntax_error_propagates() {
        let parser = SquigglyParser::new();
        assert!(parser.parse("a[b").is_err());
    }
}
