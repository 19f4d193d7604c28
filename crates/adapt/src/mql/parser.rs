// crates/adapt/src/mql/parser.rs

//! Recursive-descent parser for filter text.
//!
//! ```text
//! expr    := unary (("and" | "or") unary)*
//! unary   := "not" unary | primary
//! primary := "(" expr ")" | field operator literal
//! ```
//!
//! `and` and `or` bind with equal strength and fold left to right, so
//! `a and b or c` reads as `(a and b) or c` and `a or b and c` as
//! `(a or b) and c`. Parentheses are the only way to regroup. Runs of the same
//! connective collapse into a single n-ary node.

use super::ast::{Comparison, Filter, Literal, Operator};
use super::error::SyntaxError;
use super::lexer::{tokenize, Token, TokenKind};

/// Deepest nesting of parentheses, `not` and `and`/`or` switches accepted.
pub const MAX_DEPTH: usize = 64;

const OPERATOR_LIST: &str = "operator (eq, ne, gt, gte, lt, lte)";

/// Parse filter text into a Filter AST. Blank text yields [`Filter::always`].
pub fn parse_filter(text: &str) -> Result<Filter, SyntaxError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Ok(Filter::always());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
    };

    let filter = parser.parse_expr(0)?;
    match parser.peek() {
        None => Ok(filter),
        Some(tok) => Err(SyntaxError::new(
            tok.position,
            "`and`, `or` or end of input",
            tok.describe(),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn join(self, children: Vec<Filter>) -> Filter {
        match self {
            Connective::And => Filter::And(children),
            Connective::Or => Filter::Or(children),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(tok) => SyntaxError::new(tok.position, expected, tok.describe()),
            None => SyntaxError::new(self.end, expected, "end of input"),
        }
    }

    fn peek_connective(&self) -> Option<Connective> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case("and") => Some(Connective::And),
            Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case("or") => Some(Connective::Or),
            _ => None,
        }
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Filter, SyntaxError> {
        let mut acc = self.parse_unary(depth)?;
        let mut acc_op: Option<Connective> = None;
        let mut level = depth;

        while let Some(conn) = self.peek_connective() {
            // Switching connectives wraps `acc` in a new node one level down.
            if acc_op != Some(conn) {
                level += 1;
                if level >= MAX_DEPTH {
                    return Err(self.unexpected(&format!(
                        "at most {MAX_DEPTH} levels of nesting"
                    )));
                }
            }
            self.pos += 1;
            let rhs = self.parse_unary(level)?;

            // `acc` is only an n-ary node of `conn` if this loop built it.
            acc = match (acc_op, acc) {
                (Some(Connective::And), Filter::And(mut children)) if conn == Connective::And => {
                    children.push(rhs);
                    Filter::And(children)
                }
                (Some(Connective::Or), Filter::Or(mut children)) if conn == Connective::Or => {
                    children.push(rhs);
                    Filter::Or(children)
                }
                (_, lhs) => conn.join(vec![lhs, rhs]),
            };
            acc_op = Some(conn);
        }

        Ok(acc)
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Filter, SyntaxError> {
        if depth >= MAX_DEPTH {
            return Err(self.unexpected(&format!("at most {MAX_DEPTH} levels of nesting")));
        }

        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case("not") => {
                self.pos += 1;
                let inner = self.parse_unary(depth + 1)?;
                Ok(Filter::Not(Box::new(inner)))
            }
            Some(TokenKind::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr(depth + 1)?;
                match self.peek().map(|t| &t.kind) {
                    Some(TokenKind::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(self.unexpected("`)`, `and` or `or`")),
                }
            }
            _ => self.parse_comparison().map(Filter::Field),
        }
    }

    fn parse_comparison(&mut self) -> Result<Comparison, SyntaxError> {
        let field = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if is_field(w) && !is_keyword(w) => w.clone(),
            _ => return Err(self.unexpected("field name")),
        };
        self.pos += 1;

        let operator = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) => Operator::from_keyword(w),
            _ => None,
        }
        .ok_or_else(|| self.unexpected(OPERATOR_LIST))?;
        self.pos += 1;

        let literal = self.parse_literal()?;

        Ok(Comparison {
            field,
            operator,
            literal,
        })
    }

    fn parse_literal(&mut self) -> Result<Literal, SyntaxError> {
        let literal = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Quoted(s)) => Literal::String(s.clone()),
            Some(TokenKind::Word(w)) if !is_keyword(w) => word_literal(w),
            _ => return Err(self.unexpected("literal (number, string, true, false or null)")),
        };
        self.pos += 1;
        Ok(literal)
    }
}

fn is_keyword(word: &str) -> bool {
    ["and", "or", "not"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}

/// Dotted identifier: `segment(.segment)*`, each `[A-Za-z_][A-Za-z0-9_]*`.
fn is_field(word: &str) -> bool {
    word.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

fn word_literal(word: &str) -> Literal {
    if let Some(n) = parse_number(word) {
        return Literal::Number(n);
    }

    match word.to_ascii_lowercase().as_str() {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        "null" => Literal::Null,
        _ => Literal::String(word.to_string()),
    }
}

/// Plain decimal numbers only, so words like `inf` or `NaN` stay strings.
fn parse_number(word: &str) -> Option<f64> {
    let digits = word.strip_prefix(['-', '+']).unwrap_or(word);
    let starts_numeric = digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    let all_numeric = digits
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'));

    if !(starts_numeric && all_numeric) {
        return None;
    }

    word.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(path: &str, op: Operator, lit: Literal) -> Filter {
        Filter::Field(Comparison::new(path, op, lit))
    }

    fn num(path: &str, op: Operator, n: f64) -> Filter {
        field(path, op, Literal::Number(n))
    }

    // ─────────────────────────────────────────────────────────────
    // comparisons & literals
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_single_numeric_comparison() {
        let f = parse_filter("movies.movie.runtime gt 200").expect("parse_filter failed");
        assert_eq!(f, num("movies.movie.runtime", Operator::Gt, 200.0));
    }

    #[test]
    fn parse_every_operator_and_alias() {
        for (word, op) in [
            ("eq", Operator::Eq),
            ("ne", Operator::Ne),
            ("gt", Operator::Gt),
            ("gte", Operator::Gte),
            ("ge", Operator::Gte),
            ("lt", Operator::Lt),
            ("lte", Operator::Lte),
            ("LE", Operator::Lte),
        ] {
            let f = parse_filter(&format!("a {word} 1")).expect("parse_filter failed");
            assert_eq!(f, num("a", op, 1.0), "operator {word}");
        }
    }

    #[test]
    fn parse_literal_kinds() {
        assert_eq!(
            parse_filter(r#"t eq "Inception""#).unwrap(),
            field("t", Operator::Eq, Literal::String("Inception".into()))
        );
        assert_eq!(
            parse_filter("t eq 'two words'").unwrap(),
            field("t", Operator::Eq, Literal::String("two words".into()))
        );
        assert_eq!(
            parse_filter("c eq Brazil").unwrap(),
            field("c", Operator::Eq, Literal::String("Brazil".into()))
        );
        assert_eq!(
            parse_filter("x lt -2.5e3").unwrap(),
            num("x", Operator::Lt, -2500.0)
        );
        assert_eq!(
            parse_filter("x eq TRUE").unwrap(),
            field("x", Operator::Eq, Literal::Bool(true))
        );
        assert_eq!(
            parse_filter("x ne null").unwrap(),
            field("x", Operator::Ne, Literal::Null)
        );
        assert_eq!(
            parse_filter(r#"x eq "200""#).unwrap(),
            field("x", Operator::Eq, Literal::String("200".into()))
        );
    }

    #[test]
    fn non_decimal_number_words_stay_strings() {
        for w in ["inf", "NaN", "infinity", "1.2.3", "e5"] {
            assert_eq!(
                parse_filter(&format!("x eq {w}")).unwrap(),
                field("x", Operator::Eq, Literal::String(w.into())),
                "word {w}"
            );
        }
    }

    // ─────────────────────────────────────────────────────────────
    // empty input
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_text_is_always_true() {
        assert!(parse_filter("").unwrap().is_always());
        assert!(parse_filter("   ").unwrap().is_always());
    }

    // ─────────────────────────────────────────────────────────────
    // connectives, grouping, not
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn same_connective_runs_flatten() {
        let f = parse_filter("a gt 1 and b gt 2 AND c gt 3").unwrap();
        assert_eq!(
            f,
            Filter::And(vec![
                num("a", Operator::Gt, 1.0),
                num("b", Operator::Gt, 2.0),
                num("c", Operator::Gt, 3.0),
            ])
        );
    }

    #[test]
    fn mixed_connectives_fold_left_to_right() {
        let f = parse_filter("a eq 1 and b eq 2 or c eq 3").unwrap();
        assert_eq!(
            f,
            Filter::Or(vec![
                Filter::And(vec![num("a", Operator::Eq, 1.0), num("b", Operator::Eq, 2.0)]),
                num("c", Operator::Eq, 3.0),
            ])
        );

        let f = parse_filter("a eq 1 or b eq 2 and c eq 3").unwrap();
        assert_eq!(
            f,
            Filter::And(vec![
                Filter::Or(vec![num("a", Operator::Eq, 1.0), num("b", Operator::Eq, 2.0)]),
                num("c", Operator::Eq, 3.0),
            ])
        );
    }

    #[test]
    fn parentheses_regroup() {
        let f = parse_filter("(a eq 1) AND (b eq 2 OR c eq 3)").unwrap();
        assert_eq!(
            f,
            Filter::And(vec![
                num("a", Operator::Eq, 1.0),
                Filter::Or(vec![num("b", Operator::Eq, 2.0), num("c", Operator::Eq, 3.0)]),
            ])
        );
    }

    #[test]
    fn parenthesized_group_is_not_merged_into_outer_run() {
        let f = parse_filter("(a eq 1 and b eq 2) and c eq 3").unwrap();
        assert_eq!(
            f,
            Filter::And(vec![
                Filter::And(vec![num("a", Operator::Eq, 1.0), num("b", Operator::Eq, 2.0)]),
                num("c", Operator::Eq, 3.0),
            ])
        );
    }

    #[test]
    fn not_binds_to_the_next_operand() {
        let f = parse_filter("not a eq 1 and b eq 2").unwrap();
        assert_eq!(
            f,
            Filter::And(vec![
                Filter::Not(Box::new(num("a", Operator::Eq, 1.0))),
                num("b", Operator::Eq, 2.0),
            ])
        );

        let f = parse_filter("NOT (a eq 1 or b eq 2)").unwrap();
        assert_eq!(
            f,
            Filter::Not(Box::new(Filter::Or(vec![
                num("a", Operator::Eq, 1.0),
                num("b", Operator::Eq, 2.0),
            ])))
        );
    }

    // ─────────────────────────────────────────────────────────────
    // syntax errors
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn unknown_operator_reports_position() {
        let err = parse_filter("runtime between 200").unwrap_err();
        assert_eq!(err.position, 8);
        assert_eq!(err.expected, OPERATOR_LIST);
        assert_eq!(err.found, "`between`");
    }

    #[test]
    fn missing_literal_reports_end_of_input() {
        let err = parse_filter("runtime gt").unwrap_err();
        assert_eq!(err.position, 10);
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn keyword_is_not_a_literal_or_field() {
        let err = parse_filter("a eq and").unwrap_err();
        assert_eq!(err.position, 5);

        let err = parse_filter("and eq 1").unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.expected, "field name");
    }

    #[test]
    fn invalid_field_name_is_rejected() {
        let err = parse_filter("movies..title eq 1").unwrap_err();
        assert_eq!(err.expected, "field name");
        assert_eq!(err.position, 0);

        assert!(parse_filter("1abc eq 1").is_err());
        assert!(parse_filter(r#""title" eq 1"#).is_err());
    }

    #[test]
    fn dangling_connective_is_rejected() {
        let err = parse_filter("a eq 1 and").unwrap_err();
        assert_eq!(err.position, 10);
        assert_eq!(err.expected, "field name");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_filter("a eq 1 b eq 2").unwrap_err();
        assert_eq!(err.position, 7);
        assert_eq!(err.found, "`b`");
    }

    #[test]
    fn unbalanced_parentheses_are_rejected() {
        let err = parse_filter("(a eq 1").unwrap_err();
        assert_eq!(err.found, "end of input");

        let err = parse_filter("a eq 1)").unwrap_err();
        assert_eq!(err.position, 6);
        assert_eq!(err.found, "`)`");
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let text = format!("{}a eq 1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_filter(&text).is_err());

        let text = format!("{}a eq 1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_filter(&text).unwrap(), num("a", Operator::Eq, 1.0));
    }

    fn alternating(n: usize) -> String {
        let mut text = String::from("a eq 1");
        for i in 0..n {
            text.push_str(if i % 2 == 0 { " and a eq 1" } else { " or a eq 1" });
        }
        text
    }

    fn height(f: &Filter) -> usize {
        match f {
            Filter::Field(_) => 1,
            Filter::And(children) | Filter::Or(children) => {
                1 + children.iter().map(height).max().unwrap_or(0)
            }
            Filter::Not(inner) => 1 + height(inner),
        }
    }

    #[test]
    fn alternating_connectives_count_as_nesting() {
        let err = parse_filter(&alternating(50_000)).unwrap_err();
        assert!(err.expected.contains("levels of nesting"), "{err}");

        let f = parse_filter(&alternating(MAX_DEPTH - 1)).unwrap();
        assert_eq!(height(&f), MAX_DEPTH);
        assert!(parse_filter(&alternating(MAX_DEPTH)).is_err());
    }

    #[test]
    fn same_connective_runs_stay_shallow() {
        let text = vec!["a eq 1"; 10_000].join(" and ");
        let f = parse_filter(&text).unwrap();
        assert_eq!(height(&f), 2);
    }

    #[test]
    fn nesting_inside_parentheses_shares_the_budget() {
        let inner = alternating(MAX_DEPTH / 2);
        let text = format!("{}{inner}{}", "(".repeat(MAX_DEPTH / 2), ")".repeat(MAX_DEPTH / 2));
        assert!(parse_filter(&text).is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // round trip through Display
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn display_then_parse_yields_equal_ast() {
        for text in [
            "movies.movie.runtime gt 200",
            "a eq 1 and b eq 2 or c eq 3",
            "(a eq 1 and b eq 2) and c eq 3",
            r#"not (title eq "say \"hi\"" or year lte 1999.5)"#,
            "x eq Brazil and not not y ne null or z gte -4",
            "flag eq false",
            "",
        ] {
            let first = parse_filter(text).expect("first parse");
            let rendered = first.to_string();
            let second = parse_filter(&rendered).expect("second parse");
            assert_eq!(first, second, "text: {text} rendered: {rendered}");
        }
    }
}
