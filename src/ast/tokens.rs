/// Lexical tokens produced by the [`Lexer`](crate::lexer::Lexer).
///
/// Integer and float literals keep their raw text: in field position the raw
/// text becomes an exact name (`007` stays `007`), while in argument position
/// it is parsed into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal, raw text
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 007
    /// ```
    Integer(String),

    /// Floating-point literal, raw text
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(String),

    /// String literal, delimiters stripped and escapes resolved
    ///
    /// Single or double quoted.
    ///
    /// # Examples
    /// ```text
    /// 'it\'s'
    /// "first name"
    /// ```
    String(String),

    /// Boolean literal, case-insensitive
    ///
    /// # Examples
    /// ```text
    /// true
    /// FALSE
    /// ```
    Boolean(bool),

    /// Regex literal with its flag characters
    ///
    /// Delimited by `/` or `~`.
    ///
    /// # Examples
    /// ```text
    /// /ab+c/i
    /// ~^item~
    /// ```
    Regex { pattern: String, flags: String },

    /// Glob-style wildcard pattern (an identifier containing `*`)
    ///
    /// # Examples
    /// ```text
    /// foo*
    /// *Name*
    /// ```
    Wildcard(String),

    /// Variable reference, marker stripped and quoting resolved
    ///
    /// # Examples
    /// ```text
    /// $type
    /// $'field name'
    /// ```
    Variable(String),

    /// Field name, function name, or named operator
    Identifier(String),

    // Wildcard markers
    /// `*`: any-shallow in field position, multiplication in arguments
    Star,

    /// `**`: any-depth recursive wildcard
    DoubleStar,

    // Punctuation
    /// Dotted-path separator
    Dot,

    /// Expression/argument separator
    Comma,

    /// Function chain separator
    Colon,

    /// Function chain separator (alternate spelling)
    Pipe,

    /// Null-safe chain separator `?:`
    SafeColon,

    /// Null-safe chain separator `?|`
    SafePipe,

    /// Key-function chain introducer
    Hash,

    /// Lambda arrow `->`
    Arrow,

    LParen,
    RParen,

    /// Opens a nested sub-selection or an integer range
    LBracket,
    RBracket,

    // Operators
    Plus,

    /// Subtraction in arguments, negation prefix in selectors
    Minus,

    /// Division; outside operand position `/` opens a regex instead
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    /// Regex match `=~`
    MatchOp,

    /// Negated regex match `!~`
    NotMatchOp,
    OrOr,
    AndAnd,

    /// Logical not `!`
    Not,

    /// End of input
    Eof,
}
