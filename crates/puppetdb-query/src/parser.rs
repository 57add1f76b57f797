//! Textual query parser using nom.
//!
//! Parses the human query syntax and replays it on a [`Query`] builder:
//!
//! ```text
//! expr     := item (("and" | "or") item)*
//! item     := "(" expr ")" | ["not"] atom
//! atom     := category | hosts
//! category := ("F" | "R") ":" key [op value]
//! hosts    := host ("," host)*
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while1},
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{all_consuming, map, opt, value, verify},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};

use crate::ast::{BoolOp, Category, ComparisonOperator};
use crate::error::{QueryError, QueryResult};
use crate::query::Query;

const KEYWORDS: [&str; 3] = ["and", "or", "not"];

/// Parse a textual query into a [`Query`].
///
/// Builder errors such as mixing fact and resource conditions are returned
/// unchanged; syntax errors are reported as [`QueryError::ParseError`].
///
/// # Examples
///
/// ```rust
/// use puppetdb_query::{parse_query, Category};
///
/// let query = parse_query("(db1* or db2001) and R:Class = Mysql").unwrap();
/// assert_eq!(query.category(), Some(Category::Resource));
///
/// let query = parse_query("F:osfamily = Debian and not F:virtual = kvm").unwrap();
/// assert_eq!(query.root().tokens().len(), 2);
/// ```
pub fn parse_query(input: &str) -> QueryResult<Query> {
    if input.trim().is_empty() {
        return Err(QueryError::EmptyExpression);
    }

    let expr = match all_consuming(delimited(ws, expression, ws))(input) {
        Ok((_, expr)) => expr,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            return Err(QueryError::ParseError {
                position,
                message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
            });
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(QueryError::ParseError {
                position: input.len(),
                message: "incomplete query".to_string(),
            })
        }
    };

    let mut query = Query::new();
    expr.apply(&mut query)?;
    Ok(query)
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Syntax tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Expr {
    first: Item,
    rest: Vec<(BoolOp, Item)>,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Group(Box<Expr>),
    Condition { negate: bool, atom: Atom },
}

#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Category {
        category: Category,
        key: String,
        condition: Option<(ComparisonOperator, String)>,
    },
    Hosts(Vec<String>),
}

impl Expr {
    fn apply(&self, query: &mut Query) -> QueryResult<()> {
        self.first.apply(query)?;
        for (operator, item) in &self.rest {
            match operator {
                BoolOp::And => query.add_and()?,
                BoolOp::Or => query.add_or()?,
            }
            item.apply(query)?;
        }
        Ok(())
    }
}

impl Item {
    fn apply(&self, query: &mut Query) -> QueryResult<()> {
        match self {
            Item::Group(expr) => {
                query.open_subgroup();
                expr.apply(query)?;
                query.close_subgroup()
            }
            Item::Condition {
                negate,
                atom:
                    Atom::Category {
                        category,
                        key,
                        condition,
                    },
            } => {
                let (operator, value) = match condition {
                    Some((operator, value)) => (*operator, Some(value.as_str())),
                    None => (ComparisonOperator::Equal, None),
                };
                query.add_category(*category, key, value, operator, *negate)
            }
            Item::Condition {
                negate,
                atom: Atom::Hosts(hosts),
            } => {
                query.add_hosts(hosts.as_slice(), *negate);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

fn expression(input: &str) -> IResult<&str, Expr> {
    let (input, first) = item(input)?;
    let (input, rest) = many0(pair(delimited(mws, bool_operator, mws), item))(input)?;
    Ok((input, Expr { first, rest }))
}

fn bool_operator(input: &str) -> IResult<&str, BoolOp> {
    alt((
        value(BoolOp::And, tag_no_case("and")),
        value(BoolOp::Or, tag_no_case("or")),
    ))(input)
}

fn item(input: &str) -> IResult<&str, Item> {
    alt((
        map(
            delimited(pair(char('('), ws), expression, pair(ws, char(')'))),
            |expr| Item::Group(Box::new(expr)),
        ),
        map(
            pair(opt(terminated(tag_no_case("not"), mws)), atom),
            |(negate, atom)| Item::Condition {
                negate: negate.is_some(),
                atom,
            },
        ),
    ))(input)
}

fn atom(input: &str) -> IResult<&str, Atom> {
    alt((category_condition, map(hosts, Atom::Hosts)))(input)
}

// ============================================================================
// Category conditions
// ============================================================================

fn category_condition(input: &str) -> IResult<&str, Atom> {
    let (input, category) = map(terminated(one_of("FR"), char(':')), |c| match c {
        'F' => Category::Fact,
        _ => Category::Resource,
    })(input)?;
    let (rest, key) = take_while1(is_key_char)(input)?;
    let (rest, condition) = opt(map(
        tuple((ws, comparison_operator, ws, condition_value)),
        |(_, operator, _, value)| (operator, value),
    ))(rest)?;

    if category == Category::Fact && condition.is_none() {
        return Err(nom::Err::Failure(nom::error::Error::new(
            rest,
            nom::error::ErrorKind::Verify,
        )));
    }

    Ok((
        rest,
        Atom::Category {
            category,
            key: key.to_string(),
            condition,
        },
    ))
}

fn is_key_char(c: char) -> bool {
    !c.is_whitespace() && !"=<>~()\",".contains(c)
}

fn comparison_operator(input: &str) -> IResult<&str, ComparisonOperator> {
    alt((
        // Order matters - longer matches first
        value(ComparisonOperator::GreaterThanOrEqual, tag(">=")),
        value(ComparisonOperator::LessThanOrEqual, tag("<=")),
        value(ComparisonOperator::Equal, char('=')),
        value(ComparisonOperator::GreaterThan, char('>')),
        value(ComparisonOperator::LessThan, char('<')),
        value(ComparisonOperator::Regex, char('~')),
    ))(input)
}

fn condition_value(input: &str) -> IResult<&str, String> {
    alt((
        quoted_string,
        map(
            take_while1(|c: char| !c.is_whitespace() && c != ')' && c != '('),
            str::to_string,
        ),
    ))(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_until("\"")(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, content.to_string()))
}

// ============================================================================
// Hosts
// ============================================================================

fn hosts(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char(','), map(host, str::to_string))(input)
}

fn host(input: &str) -> IResult<&str, &str> {
    verify(
        take_while1(|c: char| !c.is_whitespace() && !"(),:=<>~\"".contains(c)),
        |h: &str| !KEYWORDS.iter().any(|k| h.eq_ignore_ascii_case(k)),
    )(input)
}

// ============================================================================
// Whitespace handling
// ============================================================================

/// Optional whitespace
fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

/// Mandatory whitespace
fn mws(input: &str) -> IResult<&str, &str> {
    multispace1(input)
}
