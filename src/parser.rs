use std::mem;

use crate::IDENTITY_FUNCTION;
use crate::ast::name::{RegexPattern, SquigglyName};
use crate::ast::node::{
    ArgumentNode, FunctionNode, IntRangeNode, LambdaNode, LambdaParameter, ParseContext,
};
use crate::ast::operators::{BinaryOp, NOT_FUNCTION, Precedence};
use crate::ast::tokens::Token;
use crate::error::ParseError;
use crate::lexer::Lexer;

/// One parsed filter expression, before tree building.
///
/// `a.b:trim[c,d]` parses to a dotted selector with a one-stage value chain
/// and a two-expression nested selection; the builder turns it into merged
/// [`MutableNode`](crate::builder::MutableNode)s.
#[derive(Debug, Clone)]
pub(crate) struct FilterExpr {
    pub context: ParseContext,
    pub negated: bool,
    pub selector: Selector,
    pub key_functions: Vec<FunctionNode>,
    pub value_functions: Vec<FunctionNode>,
    pub nested: NestedSelection,
}

#[derive(Debug, Clone)]
pub(crate) enum Selector {
    /// A single field
    Field(FieldRef),

    /// A dotted path, two or more segments
    Dotted(Vec<FieldRef>),

    /// A parenthesized alternation; each field receives the expression's
    /// chains and nested selection
    List(Vec<FieldRef>),
}

/// A resolved field name with its source position.
#[derive(Debug, Clone)]
pub(crate) struct FieldRef {
    pub name: SquigglyName,
    pub context: ParseContext,
}

#[derive(Debug, Clone)]
pub(crate) enum NestedSelection {
    /// No sub-selection given
    None,

    /// Explicit `[]`: select nothing beneath
    Empty,

    /// `[expr, expr, ...]`
    Selection(Vec<FilterExpr>),
}

/// Recursive-descent parser over a buffered token stream.
///
/// Buffering allows the single backtrack the grammar needs: `(` opens either
/// a lambda or a parenthesized argument, decided by the `->` after the
/// closing paren.
pub(crate) struct Parser {
    tokens: Vec<(Token, ParseContext)>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Ok(Parser {
            tokens: lexer.tokenize()?,
            pos: 0,
        })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn context(&self) -> ParseContext {
        self.tokens[self.pos].1
    }

    fn advance(&mut self) {
        // The final Eof entry is never stepped past.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn take(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        self.advance();
        token
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParseError> {
        if self.check(&token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::syntax(
                self.context(),
                format!("expected {}, found {:?}", what, self.current()),
            ))
        }
    }

    /// Parse a complete filter: an expression list terminated by end of
    /// input. All-or-nothing; the first violation aborts the parse.
    pub(crate) fn parse(&mut self) -> Result<Vec<FilterExpr>, ParseError> {
        let expressions = self.parse_expression_list()?;
        self.expect(Token::Eof, "end of filter")?;
        Ok(expressions)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<FilterExpr>, ParseError> {
        let mut expressions = vec![self.parse_expression()?];

        while self.check(&Token::Comma) {
            self.advance();
            expressions.push(self.parse_expression()?);
        }

        Ok(expressions)
    }

    fn parse_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let context = self.context();

        if self.check(&Token::Minus) {
            self.advance();
            return self.parse_negated_expression(context);
        }

        let selector = self.parse_selector()?;

        let key_functions = if self.check(&Token::Hash) {
            self.advance();
            self.parse_function_chain(true, false)?
        } else {
            Vec::new()
        };

        let value_functions = match chain_separator(self.current()) {
            Some(ignore_nulls) => {
                self.advance();
                self.parse_function_chain(true, ignore_nulls)?
            }
            None => Vec::new(),
        };

        let nested = self.parse_nested_selection()?;

        Ok(FilterExpr {
            context,
            negated: false,
            selector,
            key_functions,
            value_functions,
            nested,
        })
    }

    /// `-field` or `-a.b.c`. Negations carry no function chains or nested
    /// selections.
    fn parse_negated_expression(&mut self, context: ParseContext) -> Result<FilterExpr, ParseError> {
        let first = self.parse_field_ref()?;

        let selector = if self.check(&Token::Dot) {
            let mut fields = vec![first];
            while self.check(&Token::Dot) {
                self.advance();
                fields.push(self.parse_field_ref()?);
            }
            Selector::Dotted(fields)
        } else {
            Selector::Field(first)
        };

        Ok(FilterExpr {
            context,
            negated: true,
            selector,
            key_functions: Vec::new(),
            value_functions: Vec::new(),
            nested: NestedSelection::None,
        })
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        if self.check(&Token::LParen) {
            self.advance();
            let mut fields = vec![self.parse_field_ref()?];
            while self.check(&Token::Comma) {
                self.advance();
                fields.push(self.parse_field_ref()?);
            }
            self.expect(Token::RParen, "')'")?;
            return Ok(Selector::List(fields));
        }

        let first = self.parse_field_ref()?;

        if self.check(&Token::Dot) {
            let mut fields = vec![first];
            while self.check(&Token::Dot) {
                self.advance();
                fields.push(self.parse_field_ref()?);
            }
            Ok(Selector::Dotted(fields))
        } else {
            Ok(Selector::Field(first))
        }
    }

    fn parse_field_ref(&mut self) -> Result<FieldRef, ParseError> {
        let context = self.context();

        let name = match self.take() {
            Token::Identifier(name) => SquigglyName::Exact(name),
            Token::String(name) => SquigglyName::Exact(name),
            // An integer in field position is a literal name, raw text kept
            Token::Integer(raw) => SquigglyName::Exact(raw),
            Token::Wildcard(pattern) => SquigglyName::Wildcard(pattern),
            Token::Star => SquigglyName::AnyShallow,
            Token::DoubleStar => SquigglyName::AnyDeep,
            Token::Regex { pattern, flags } => {
                SquigglyName::Regex(RegexPattern::compile(&pattern, &flags, context)?)
            }
            Token::Variable(name) => SquigglyName::Variable(name),
            other => {
                return Err(ParseError::syntax(
                    context,
                    format!("expected field name, found {:?}", other),
                ));
            }
        };

        Ok(FieldRef { name, context })
    }

    fn parse_nested_selection(&mut self) -> Result<NestedSelection, ParseError> {
        if !self.check(&Token::LBracket) {
            return Ok(NestedSelection::None);
        }
        self.advance();

        if self.check(&Token::RBracket) {
            self.advance();
            return Ok(NestedSelection::Empty);
        }

        let expressions = self.parse_expression_list()?;
        self.expect(Token::RBracket, "']'")?;
        Ok(NestedSelection::Selection(expressions))
    }

    /// A `:`/`|`-separated sequence of function calls. `with_input` prepends
    /// the [`ArgumentNode::Input`] placeholder to every stage, threading each
    /// stage's output into the next; argument-position chains are plain.
    fn parse_function_chain(
        &mut self,
        with_input: bool,
        first_ignore_nulls: bool,
    ) -> Result<Vec<FunctionNode>, ParseError> {
        let mut functions = vec![self.parse_function(with_input, first_ignore_nulls)?];

        while let Some(ignore_nulls) = chain_separator(self.current()) {
            self.advance();
            functions.push(self.parse_function(with_input, ignore_nulls)?);
        }

        Ok(functions)
    }

    fn parse_function(
        &mut self,
        with_input: bool,
        ignore_nulls: bool,
    ) -> Result<FunctionNode, ParseError> {
        let context = self.context();

        let name = match self.take() {
            Token::Identifier(name) => name,
            other => {
                return Err(ParseError::syntax(
                    context,
                    format!("expected function name, found {:?}", other),
                ));
            }
        };

        let mut parameters = if with_input {
            vec![ArgumentNode::Input]
        } else {
            Vec::new()
        };

        // Parens are optional for zero-argument calls: `a:trim`.
        if self.check(&Token::LParen) {
            self.advance();
            if !self.check(&Token::RParen) {
                parameters.push(self.parse_arg()?);
                while self.check(&Token::Comma) {
                    self.advance();
                    parameters.push(self.parse_arg()?);
                }
            }
            self.expect(Token::RParen, "')'")?;
        }

        Ok(FunctionNode {
            name,
            parameters,
            ignore_nulls,
            context,
        })
    }

    // ------------------------------------------------------------------
    // Argument grammar: precedence ladder, loosest first. Operators accept
    // both symbolic and named spellings and desugar into canonical-name
    // function chains.
    // ------------------------------------------------------------------

    fn parse_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        self.parse_or_arg()
    }

    fn binary_op_at(&self, precedence: Precedence) -> Option<BinaryOp> {
        let op = match self.current() {
            Token::OrOr => BinaryOp::Or,
            Token::AndAnd => BinaryOp::And,
            Token::EqEq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::Ne,
            Token::MatchOp => BinaryOp::Match,
            Token::NotMatchOp => BinaryOp::Nmatch,
            Token::Lt => BinaryOp::Lt,
            Token::LtEq => BinaryOp::Lte,
            Token::Gt => BinaryOp::Gt,
            Token::GtEq => BinaryOp::Gte,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
            Token::Identifier(name) => BinaryOp::from_named(name)?,
            _ => return None,
        };
        (op.precedence() == precedence).then_some(op)
    }

    fn desugar_binary(
        op: BinaryOp,
        context: ParseContext,
        left: ArgumentNode,
        right: ArgumentNode,
    ) -> ArgumentNode {
        ArgumentNode::FunctionChain(vec![FunctionNode {
            name: op.function_name().to_string(),
            parameters: vec![left, right],
            ignore_nulls: false,
            context,
        }])
    }

    fn parse_or_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_and_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::Or) {
            let context = self.context();
            self.advance();
            let right = self.parse_and_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_and_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_equality_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::And) {
            let context = self.context();
            self.advance();
            let right = self.parse_equality_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_equality_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_comparison_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::Equality) {
            let context = self.context();
            self.advance();
            let right = self.parse_comparison_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_comparison_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_additive_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::Comparison) {
            let context = self.context();
            self.advance();
            let right = self.parse_additive_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_additive_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_multiplicative_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::Additive) {
            let context = self.context();
            self.advance();
            let right = self.parse_multiplicative_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let mut left = self.parse_unary_arg()?;
        while let Some(op) = self.binary_op_at(Precedence::Multiplicative) {
            let context = self.context();
            self.advance();
            let right = self.parse_unary_arg()?;
            left = Self::desugar_binary(op, context, left, right);
        }
        Ok(left)
    }

    fn parse_unary_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        if self.check(&Token::Not) {
            let context = self.context();
            self.advance();
            let operand = self.parse_unary_arg()?;
            return Ok(ArgumentNode::FunctionChain(vec![FunctionNode {
                name: NOT_FUNCTION.to_string(),
                parameters: vec![operand],
                ignore_nulls: false,
                context,
            }]));
        }

        if self.check(&Token::Minus) {
            let context = self.context();
            self.advance();
            return match self.take() {
                // Sign and digits parse as one literal so i32::MIN is
                // representable.
                Token::Integer(raw) => Ok(ArgumentNode::Integer(parse_integer(
                    &format!("-{}", raw),
                    context,
                )?)),
                Token::Float(raw) => Ok(ArgumentNode::Float(-parse_float(&raw, context)?)),
                other => Err(ParseError::syntax(
                    context,
                    format!("expected numeric literal after '-', found {:?}", other),
                )),
            };
        }

        self.parse_primary_arg()
    }

    fn parse_primary_arg(&mut self) -> Result<ArgumentNode, ParseError> {
        let context = self.context();

        match self.current() {
            Token::Boolean(_)
            | Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Regex { .. }
            | Token::Variable(_) => {
                let arg = match self.take() {
                    Token::Boolean(value) => ArgumentNode::Boolean(value),
                    Token::Integer(raw) => ArgumentNode::Integer(parse_integer(&raw, context)?),
                    Token::Float(raw) => ArgumentNode::Float(parse_float(&raw, context)?),
                    Token::String(value) => ArgumentNode::String(value),
                    Token::Regex { pattern, flags } => {
                        ArgumentNode::Regex(RegexPattern::compile(&pattern, &flags, context)?)
                    }
                    Token::Variable(name) => ArgumentNode::Variable(name),
                    _ => unreachable!(),
                };
                Ok(arg)
            }

            Token::LBracket => self.parse_int_range(),

            Token::LParen => {
                if let Some(lambda) = self.try_parse_lambda()? {
                    return Ok(lambda);
                }
                self.advance();
                let inner = self.parse_arg()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }

            Token::Identifier(_) => {
                let chain = self.parse_function_chain(false, false)?;
                Ok(ArgumentNode::FunctionChain(chain))
            }

            other => Err(ParseError::syntax(
                context,
                format!("expected argument, found {:?}", other),
            )),
        }
    }

    /// `[start?:end?]` with endpoints restricted to integer literals and
    /// variables.
    fn parse_int_range(&mut self) -> Result<ArgumentNode, ParseError> {
        self.advance(); // consume '['

        let start = if self.check(&Token::Colon) {
            None
        } else {
            Some(self.parse_range_endpoint()?)
        };

        self.expect(Token::Colon, "':'")?;

        let end = if self.check(&Token::RBracket) {
            None
        } else {
            Some(self.parse_range_endpoint()?)
        };

        self.expect(Token::RBracket, "']'")?;

        Ok(ArgumentNode::IntRange(IntRangeNode {
            start: start.map(Box::new),
            end: end.map(Box::new),
        }))
    }

    fn parse_range_endpoint(&mut self) -> Result<ArgumentNode, ParseError> {
        let context = self.context();
        match self.take() {
            Token::Integer(raw) => Ok(ArgumentNode::Integer(parse_integer(&raw, context)?)),
            Token::Variable(name) => Ok(ArgumentNode::Variable(name)),
            Token::Minus => match self.take() {
                Token::Integer(raw) => Ok(ArgumentNode::Integer(parse_integer(
                    &format!("-{}", raw),
                    context,
                )?)),
                other => Err(ParseError::syntax(
                    context,
                    format!("expected integer after '-', found {:?}", other),
                )),
            },
            other => Err(ParseError::syntax(
                context,
                format!(
                    "expected integer or variable range endpoint, found {:?}",
                    other
                ),
            )),
        }
    }

    /// Attempts `( params ) -> arg`; restores the position and returns
    /// `None` when the tokens turn out to be a parenthesized argument.
    fn try_parse_lambda(&mut self) -> Result<Option<ArgumentNode>, ParseError> {
        let start = self.pos;
        self.advance(); // consume '('

        let mut parameters = Vec::new();
        if matches!(self.current(), Token::Identifier(_)) {
            loop {
                match self.take() {
                    Token::Identifier(name) if name == "_" => {
                        parameters.push(LambdaParameter::Anonymous);
                    }
                    Token::Identifier(name) => parameters.push(LambdaParameter::Named(name)),
                    _ => {
                        self.pos = start;
                        return Ok(None);
                    }
                }
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if !self.check(&Token::RParen) {
            self.pos = start;
            return Ok(None);
        }
        self.advance();

        if !self.check(&Token::Arrow) {
            self.pos = start;
            return Ok(None);
        }
        self.advance();

        let body_context = self.context();
        let body_arg = self.parse_arg()?;

        Ok(Some(ArgumentNode::Lambda(LambdaNode {
            parameters,
            body: Box::new(FunctionNode {
                name: IDENTITY_FUNCTION.to_string(),
                parameters: vec![body_arg],
                ignore_nulls: false,
                context: body_context,
            }),
        })))
    }
}

/// `Some(ignore_nulls)` when the token separates function chain stages.
fn chain_separator(token: &Token) -> Option<bool> {
    match token {
        Token::Colon | Token::Pipe => Some(false),
        Token::SafeColon | Token::SafePipe => Some(true),
        _ => None,
    }
}

fn parse_integer(raw: &str, context: ParseContext) -> Result<i32, ParseError> {
    raw.parse::<i32>()
        .map_err(|_| ParseError::syntax(context, format!("invalid integer literal '{}'", raw)))
}

fn parse_float(raw: &str, context: ParseContext) -> Result<f32, ParseError> {
    raw.parse::<f32>()
        .map_err(|_| ParseError::syntax(context, format!("invalid float literal '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(filter: &str) -> Vec<FilterExpr> {
        Parser::new(Lexer::new(filter)).unwrap().parse().unwrap()
    }

    #[test]
    fn test_dotted_selector() {
        let exprs = parse("a.b.c");
        assert_eq!(exprs.len(), 1);
        match &exprs[0].selector {
            Selector::Dotted(fields) => assert_eq!(fields.len(), 3),
            other => panic!("expected dotted selector, got {:?}", other),
        }
    }

    #[test]
    fn test_field_list_shares_chain() {
        let exprs = parse("(a,b):trim");
        match &exprs[0].selector {
            Selector::List(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected field list, got {:?}", other),
        }
        assert_eq!(exprs[0].value_functions.len(), 1);
        assert_eq!(exprs[0].value_functions[0].name, "trim");
    }

    #[test]
    fn test_null_safe_separator() {
        let exprs = parse("a?:trim|upper");
        let chain = &exprs[0].value_functions;
        assert!(chain[0].ignore_nulls);
        assert!(!chain[1].ignore_nulls);
    }

    #[test]
    fn test_key_function_chain() {
        let exprs = parse("a#upper:trim");
        assert_eq!(exprs[0].key_functions[0].name, "upper");
        assert_eq!(exprs[0].value_functions[0].name, "trim");
    }

    #[test]
    fn test_lambda_argument() {
        let exprs = parse("a:map((x, _) -> x)");
        let chain = &exprs[0].value_functions;
        match &chain[0].parameters[1] {
            ArgumentNode::Lambda(lambda) => {
                assert_eq!(lambda.parameters.len(), 2);
                assert_eq!(lambda.body.name, IDENTITY_FUNCTION);
            }
            other => panic!("expected lambda, got {:?}", other),
        }
    }

    #[test]
    fn test_grouped_argument_is_transparent() {
        let exprs = parse("a:f((1))");
        let chain = &exprs[0].value_functions;
        assert_eq!(chain[0].parameters[1], ArgumentNode::Integer(1));
    }

    #[test]
    fn test_int_range_open_ends() {
        let exprs = parse("a:slice([1:])");
        let chain = &exprs[0].value_functions;
        match &chain[0].parameters[1] {
            ArgumentNode::IntRange(range) => {
                assert_eq!(range.start.as_deref(), Some(&ArgumentNode::Integer(1)));
                assert!(range.end.is_none());
            }
            other => panic!("expected int range, got {:?}", other),
        }
    }

    #[test]
    fn test_named_operator_spelling() {
        let symbolic = parse("a:f(1+2)");
        let named = parse("a:f(1 add 2)");
        assert_eq!(
            symbolic[0].value_functions[0].parameters,
            named[0].value_functions[0].parameters
        );
    }

    #[test]
    fn test_trailing_garbage_fails() {
        let result = Parser::new(Lexer::new("a b")).unwrap().parse();
        assert!(result.is_err());
    }
}
