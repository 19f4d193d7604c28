use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Comparison operators understood by the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
        }
    }

    /// Case-insensitive keyword lookup. `ge` and `le` are accepted as
    /// aliases of `gte` and `lte`.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "eq" => Some(Operator::Eq),
            "ne" => Some(Operator::Ne),
            "gt" => Some(Operator::Gt),
            "gte" | "ge" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" | "le" => Some(Operator::Lte),
            _ => None,
        }
    }

    /// `gt`, `gte`, `lt` and `lte` need an ordering between operands.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// A single comparison: `<field> <operator> <literal>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String, // e.g. "movies.movie.runtime"
    pub operator: Operator,
    pub literal: Literal,
}

impl Comparison {
    pub fn new(field: impl Into<String>, operator: Operator, literal: Literal) -> Self {
        Self {
            field: field.into(),
            operator,
            literal,
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.literal)
    }
}

/// Filter tree:
/// - Field(comparison)
/// - And([...]); an empty And matches every record
/// - Or([...])
/// - Not(filter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    Field(Comparison),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// The always-true filter produced by empty filter text.
    pub fn always() -> Self {
        Filter::And(Vec::new())
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Filter::And(children) if children.is_empty())
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(_) | Filter::Or(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl From<Comparison> for Filter {
    fn from(cmp: Comparison) -> Self {
        Filter::Field(cmp)
    }
}

/// Renders filter text that parses back to the same tree.
impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Field(cmp) => write!(f, "{cmp}"),
            Filter::And(children) | Filter::Or(children) => {
                let joiner = if matches!(self, Filter::And(_)) {
                    " and "
                } else {
                    " or "
                };
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(joiner)?;
                    }
                    child.fmt_operand(f)?;
                }
                Ok(())
            }
            Filter::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_operand(f)
            }
        }
    }
}
