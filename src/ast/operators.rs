/// Binary operators accepted in argument expressions.
///
/// Each operator has a symbolic spelling and a named spelling; both desugar
/// into a function call with the canonical name from
/// [`function_name`](BinaryOp::function_name).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` / `add`
    Add,
    /// `-` / `sub`
    Sub,
    /// `*` / `mul`
    Mul,
    /// `/` / `div`
    Div,
    /// `%` / `mod`
    Mod,
    /// `==` / `eq`
    Eq,
    /// `!=` / `ne`
    Ne,
    /// `<` / `lt`
    Lt,
    /// `<=` / `lte`
    Lte,
    /// `>` / `gt`
    Gt,
    /// `>=` / `gte`
    Gte,
    /// `=~` / `match`
    Match,
    /// `!~` / `nmatch`
    Nmatch,
    /// `||` / `or`
    Or,
    /// `&&` / `and`
    And,
}

/// Precedence tiers, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Or,
    And,
    Equality,
    Comparison,
    Additive,
    Multiplicative,
}

impl BinaryOp {
    /// The canonical function name the operator desugars to.
    pub fn function_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Lte => "lte",
            BinaryOp::Gt => "gt",
            BinaryOp::Gte => "gte",
            BinaryOp::Match => "match",
            BinaryOp::Nmatch => "nmatch",
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
        }
    }

    /// Look up an operator by its named spelling.
    pub fn from_named(name: &str) -> Option<Self> {
        let op = match name {
            "add" => BinaryOp::Add,
            "sub" => BinaryOp::Sub,
            "mul" => BinaryOp::Mul,
            "div" => BinaryOp::Div,
            "mod" => BinaryOp::Mod,
            "eq" => BinaryOp::Eq,
            "ne" => BinaryOp::Ne,
            "lt" => BinaryOp::Lt,
            "lte" => BinaryOp::Lte,
            "gt" => BinaryOp::Gt,
            "gte" => BinaryOp::Gte,
            "match" => BinaryOp::Match,
            "nmatch" => BinaryOp::Nmatch,
            "or" => BinaryOp::Or,
            "and" => BinaryOp::And,
            _ => return None,
        };
        Some(op)
    }

    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Or => Precedence::Or,
            BinaryOp::And => Precedence::And,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Match | BinaryOp::Nmatch => {
                Precedence::Equality
            }
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => Precedence::Comparison,
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Precedence::Multiplicative,
        }
    }
}

/// Canonical name for the `!` prefix operator.
pub const NOT_FUNCTION: &str = "not";
