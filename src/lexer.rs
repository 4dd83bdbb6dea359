use crate::ast::Token;
use crate::ast::node::ParseContext;
use crate::ast::operators::BinaryOp;
use crate::error::ParseError;

/// Pull-style tokenizer for filter expressions.
///
/// Two tokens are position-sensitive: `/` and `*`. After a token that can
/// end an operand (a literal, identifier, or closing delimiter) they lex as
/// the division and multiplication operators; anywhere else `/` opens a
/// regex literal and `*` opens a wildcard. Identifiers scanned adjacent to
/// `*` merge into a single wildcard pattern, so `a*b` is a wildcard name
/// while `a * b` multiplies.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    after_operand: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            after_operand: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn context(&self) -> ParseContext {
        ParseContext::new(self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '*'
    }

    /// Reads a run of identifier characters, `*` included.
    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_word_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char, ctx: ParseContext) -> Result<String, ParseError> {
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{0008}'),
                        Some('f') => result.push('\u{000c}'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('/') => result.push('/'),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape(ctx)?);
                            continue;
                        }
                        Some(ch) => {
                            return Err(ParseError::syntax(
                                self.context(),
                                format!("invalid escape sequence '\\{}'", ch),
                            ));
                        }
                        None => {
                            return Err(ParseError::syntax(
                                ctx,
                                "unterminated string literal".to_string(),
                            ));
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(ParseError::syntax(ctx, "unterminated string literal"))
    }

    /// Reads the four hex digits of a `\uXXXX` escape. The `u` is already
    /// consumed.
    fn read_unicode_escape(&mut self, ctx: ParseContext) -> Result<char, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    ParseError::syntax(ctx, "expected four hex digits after '\\u'")
                })?;
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code)
            .ok_or_else(|| ParseError::syntax(ctx, format!("invalid unicode escape {:#06x}", code)))
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            Token::Float(number)
        } else {
            Token::Integer(number)
        }
    }

    /// Reads a regex literal delimited by `delim`, then its trailing flag
    /// characters. Backslash escapes are kept verbatim in the pattern except
    /// for an escaped delimiter, which is unwrapped.
    fn read_regex(&mut self, delim: char, ctx: ParseContext) -> Result<Token, ParseError> {
        let mut pattern = String::new();
        self.advance(); // consume opening delimiter

        loop {
            match self.current_char() {
                None => {
                    return Err(ParseError::syntax(ctx, "unterminated regex literal"));
                }
                Some(c) if c == delim => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(c) if c == delim => pattern.push(c),
                        Some(c) => {
                            pattern.push('\\');
                            pattern.push(c);
                        }
                        None => {
                            return Err(ParseError::syntax(ctx, "unterminated regex literal"));
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    pattern.push(c);
                    self.advance();
                }
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(Token::Regex { pattern, flags })
    }

    fn read_variable(&mut self, ctx: ParseContext) -> Result<Token, ParseError> {
        self.advance(); // consume '$'
        match self.current_char() {
            Some(q @ ('\'' | '"')) => Ok(Token::Variable(self.read_string(q, ctx)?)),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                Ok(Token::Variable(self.read_identifier()))
            }
            _ => Err(ParseError::syntax(ctx, "expected variable name after '$'")),
        }
    }

    pub fn next_token(&mut self) -> Result<(Token, ParseContext), ParseError> {
        self.skip_whitespace();
        let ctx = self.context();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('.') => {
                self.advance();
                Token::Dot
            }
            Some('#') => {
                self.advance();
                Token::Hash
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.advance();
                    self.advance();
                    Token::OrOr
                } else {
                    self.advance();
                    Token::Pipe
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.advance();
                    self.advance();
                    Token::AndAnd
                } else {
                    return Err(ParseError::UnknownOperator {
                        context: ctx,
                        operator: "&".to_string(),
                    });
                }
            }
            Some('?') => match self.peek_char(1) {
                Some(':') => {
                    self.advance();
                    self.advance();
                    Token::SafeColon
                }
                Some('|') => {
                    self.advance();
                    self.advance();
                    Token::SafePipe
                }
                _ => {
                    return Err(ParseError::syntax(ctx, "unexpected '?'"));
                }
            },
            Some('-') => {
                if self.peek_char(1) == Some('>') {
                    self.advance();
                    self.advance();
                    Token::Arrow
                } else {
                    self.advance();
                    Token::Minus
                }
            }
            Some('+') => {
                self.advance();
                Token::Plus
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some('=') => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.advance();
                    Token::EqEq
                }
                Some('~') => {
                    self.advance();
                    self.advance();
                    Token::MatchOp
                }
                _ => {
                    return Err(ParseError::UnknownOperator {
                        context: ctx,
                        operator: "=".to_string(),
                    });
                }
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.advance();
                    Token::NotEq
                }
                Some('~') => {
                    self.advance();
                    self.advance();
                    Token::NotMatchOp
                }
                _ => {
                    self.advance();
                    Token::Not
                }
            },
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::LtEq
                } else {
                    self.advance();
                    Token::Lt
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::GtEq
                } else {
                    self.advance();
                    Token::Gt
                }
            }
            Some('/') => {
                if self.after_operand {
                    self.advance();
                    Token::Slash
                } else {
                    self.read_regex('/', ctx)?
                }
            }
            Some('~') => self.read_regex('~', ctx)?,
            Some('*') => {
                if self.after_operand {
                    self.advance();
                    Token::Star
                } else {
                    let word = self.read_word();
                    Self::classify_word(word)
                }
            }
            Some('$') => self.read_variable(ctx)?,
            Some(q @ ('\'' | '"')) => Token::String(self.read_string(q, ctx)?),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_word();
                Self::classify_word(word)
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => {
                return Err(ParseError::syntax(
                    ctx,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        self.after_operand = match &token {
            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Boolean(_)
            | Token::Wildcard(_)
            | Token::Variable(_)
            | Token::Regex { .. }
            | Token::RParen
            | Token::RBracket => true,
            // A named operator spelling positions like its symbolic form, so
            // `x match /x/` lexes the regex rather than a division.
            Token::Identifier(name) => BinaryOp::from_named(name).is_none(),
            _ => false,
        };

        Ok((token, ctx))
    }

    fn classify_word(word: String) -> Token {
        if word == "*" {
            Token::Star
        } else if word == "**" {
            Token::DoubleStar
        } else if word.contains('*') {
            Token::Wildcard(word)
        } else if word.eq_ignore_ascii_case("true") {
            Token::Boolean(true)
        } else if word.eq_ignore_ascii_case("false") {
            Token::Boolean(false)
        } else {
            Token::Identifier(word)
        }
    }

    /// Drains the input into a buffered token stream, terminating `Eof`
    /// included.
    pub fn tokenize(mut self) -> Result<Vec<(Token, ParseContext)>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let (token, context) = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, context));
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_selector_tokens() {
    let mut lexer = Lexer::new("a.b,-c,(d,e)");
    assert_eq!(lexer.next_token().unwrap().0, Token::Identifier("a".to_string()));
    assert_eq!(lexer.next_token().unwrap().0, Token::Dot);
    assert_eq!(lexer.next_token().unwrap().0, Token::Identifier("b".to_string()));
    assert_eq!(lexer.next_token().unwrap().0, Token::Comma);
    assert_eq!(lexer.next_token().unwrap().0, Token::Minus);
    assert_eq!(lexer.next_token().unwrap().0, Token::Identifier("c".to_string()));
}

#[test]
fn test_wildcards() {
    let mut lexer = Lexer::new("foo*,*,**");
    assert_eq!(lexer.next_token().unwrap().0, Token::Wildcard("foo*".to_string()));
    assert_eq!(lexer.next_token().unwrap().0, Token::Comma);
    assert_eq!(lexer.next_token().unwrap().0, Token::Star);
    assert_eq!(lexer.next_token().unwrap().0, Token::Comma);
    assert_eq!(lexer.next_token().unwrap().0, Token::DoubleStar);
}

#[test]
fn test_slash_is_positional() {
    // After an operand it divides, elsewhere it opens a regex.
    let mut lexer = Lexer::new("f(1 / 2, /ab+/i)");
    let tokens: Vec<Token> = std::iter::from_fn(|| Some(lexer.next_token().unwrap().0))
        .take_while(|t| *t != Token::Eof)
        .collect();
    assert!(tokens.contains(&Token::Slash));
    assert!(tokens.contains(&Token::Regex {
        pattern: "ab+".to_string(),
        flags: "i".to_string()
    }));
}
