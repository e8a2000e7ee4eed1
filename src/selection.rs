//! Atom selection expressions such as `resid 3 to 12 and name N CA C O`.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::topology::{Atom, Topology};

const PROTEIN_RESIDUES: [&str; 35] = [
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "HSD", "HSE", "HSP", "HID", "HIE", "HIP",
    "CYX", "CYM", "ASH", "GLH", "LYN", "ACE", "NME", "NMA", "MSE",
];
const BACKBONE_NAMES: [&str; 4] = ["N", "CA", "C", "O"];

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    UnexpectedToken(String),
    UnexpectedEnd,
    MissingValues(String),
    InvalidNumber(String),
    UnbalancedParentheses,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for SelectionError {}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first: i64,
    pub last: i64,
}

impl Span {
    fn contains(&self, value: i64) -> bool {
        self.first <= value && value <= self.last
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    None,
    Name(Vec<String>),
    Resname(Vec<String>),
    Element(Vec<String>),
    Chain(Vec<String>),
    Resid(Vec<Span>),
    /// 0-based atom position.
    Index(Vec<Span>),
    /// 1-based atom position.
    Bynum(Vec<Span>),
    Backbone,
    Protein,
    Not(Box<Selection>),
    And(Box<Selection>, Box<Selection>),
    Or(Box<Selection>, Box<Selection>),
}

fn glob_match(pattern: &str, value: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

fn tokenize(expression: &str) -> Vec<String> {
    expression
        .replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn is_boundary(token: &str) -> bool {
    matches!(token, "and" | "or" | "not" | "(" | ")")
}

struct Parser {
    tokens: Peekable<IntoIter<String>>,
}

impl Parser {
    fn or_expr(&mut self) -> Result<Selection, SelectionError> {
        let mut lhs = self.and_expr()?;
        while self.tokens.next_if(|t| t == "or").is_some() {
            lhs = Selection::Or(Box::new(lhs), Box::new(self.and_expr()?));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Selection, SelectionError> {
        let mut lhs = self.not_expr()?;
        while self.tokens.next_if(|t| t == "and").is_some() {
            lhs = Selection::And(Box::new(lhs), Box::new(self.not_expr()?));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Selection, SelectionError> {
        if self.tokens.next_if(|t| t == "not").is_some() {
            return Ok(Selection::Not(Box::new(self.not_expr()?)));
        }
        self.primary()
    }

    fn values(&mut self, keyword: &str) -> Result<Vec<String>, SelectionError> {
        let mut values = Vec::new();
        while let Some(token) = self.tokens.next_if(|t| !is_boundary(t)) {
            values.push(token);
        }
        if values.is_empty() {
            return Err(SelectionError::MissingValues(keyword.to_string()));
        }
        Ok(values)
    }

    fn spans(&mut self, keyword: &str) -> Result<Vec<Span>, SelectionError> {
        let values = self.values(keyword)?;
        let number = |s: &str| {
            s.parse::<i64>()
                .map_err(|_| SelectionError::InvalidNumber(s.to_string()))
        };
        let mut spans = Vec::new();
        let mut values = values.iter().peekable();
        while let Some(value) = values.next() {
            if values.next_if(|v| *v == "to").is_some() {
                let last = values.next().ok_or(SelectionError::UnexpectedEnd)?;
                spans.push(Span {
                    first: number(value)?,
                    last: number(last)?,
                });
                continue;
            }
            // a leading '-' belongs to the number
            let split = value
                .char_indices()
                .skip(1)
                .find(|&(_, c)| c == '-' || c == ':')
                .map(|(i, _)| i);
            let span = match split {
                Some(i) => Span {
                    first: number(&value[..i])?,
                    last: number(&value[i + 1..])?,
                },
                None => {
                    let n = number(value)?;
                    Span { first: n, last: n }
                }
            };
            spans.push(span);
        }
        Ok(spans)
    }

    fn primary(&mut self) -> Result<Selection, SelectionError> {
        let token = self.tokens.next().ok_or(SelectionError::UnexpectedEnd)?;
        match token.as_str() {
            "(" => {
                let inner = self.or_expr()?;
                match self.tokens.next().as_deref() {
                    Some(")") => Ok(inner),
                    _ => Err(SelectionError::UnbalancedParentheses),
                }
            }
            "all" => Ok(Selection::All),
            "none" => Ok(Selection::None),
            "backbone" => Ok(Selection::Backbone),
            "protein" => Ok(Selection::Protein),
            "name" => Ok(Selection::Name(self.values(&token)?)),
            "resname" => Ok(Selection::Resname(self.values(&token)?)),
            "element" => Ok(Selection::Element(self.values(&token)?)),
            "chain" | "segid" => Ok(Selection::Chain(self.values(&token)?)),
            "resid" | "resnum" => Ok(Selection::Resid(self.spans(&token)?)),
            "index" => Ok(Selection::Index(self.spans(&token)?)),
            "bynum" => Ok(Selection::Bynum(self.spans(&token)?)),
            ")" => Err(SelectionError::UnbalancedParentheses),
            _ => Err(SelectionError::UnexpectedToken(token)),
        }
    }
}

impl Selection {
    /// Parses `expression`; an empty expression selects everything.
    pub fn parse(expression: &str) -> Result<Self, SelectionError> {
        let tokens = tokenize(expression);
        if tokens.is_empty() {
            return Ok(Selection::All);
        }
        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
        };
        let selection = parser.or_expr()?;
        match parser.tokens.next() {
            None => Ok(selection),
            Some(t) if t == ")" => Err(SelectionError::UnbalancedParentheses),
            Some(t) => Err(SelectionError::UnexpectedToken(t)),
        }
    }

    pub fn matches(&self, index: usize, atom: &Atom) -> bool {
        let any = |patterns: &[String], value: &str| patterns.iter().any(|p| glob_match(p, value));
        let within = |spans: &[Span], value: i64| spans.iter().any(|s| s.contains(value));
        match self {
            Selection::All => true,
            Selection::None => false,
            Selection::Name(p) => any(p, &atom.name),
            Selection::Resname(p) => any(p, &atom.resname),
            Selection::Element(p) => any(p, &atom.element),
            Selection::Chain(p) => any(p, &atom.chain),
            Selection::Resid(s) => within(s, atom.resid),
            Selection::Index(s) => within(s, index as i64),
            Selection::Bynum(s) => within(s, index as i64 + 1),
            Selection::Protein => PROTEIN_RESIDUES.contains(&atom.resname.as_str()),
            Selection::Backbone => {
                PROTEIN_RESIDUES.contains(&atom.resname.as_str())
                    && BACKBONE_NAMES.contains(&atom.name.as_str())
            }
            Selection::Not(inner) => !inner.matches(index, atom),
            Selection::And(a, b) => a.matches(index, atom) && b.matches(index, atom),
            Selection::Or(a, b) => a.matches(index, atom) || b.matches(index, atom),
        }
    }

    /// Positions of the selected atoms, in topology order.
    pub fn apply(&self, topology: &Topology) -> Vec<usize> {
        topology
            .atoms
            .iter()
            .enumerate()
            .filter(|(i, atom)| self.matches(*i, atom))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tests::PDB;

    fn topology() -> Topology {
        Topology::parse_pdb(PDB).unwrap()
    }

    fn select(expression: &str) -> Vec<usize> {
        Selection::parse(expression).unwrap().apply(&topology())
    }

    #[test]
    fn test_simple_selections() {
        assert_eq!(select(""), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(select("none"), Vec::<usize>::new());
        assert_eq!(select("name CA CB"), vec![1, 4]);
        assert_eq!(select("name C*"), vec![1, 2, 4]);
        assert_eq!(select("resname HOH"), vec![5]);
        assert_eq!(select("element O"), vec![3, 5]);
        assert_eq!(select("chain B"), vec![5]);
        assert_eq!(select("backbone"), vec![0, 1, 2, 3]);
        assert_eq!(select("protein"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(select("index 0 to 2"), vec![0, 1, 2]);
        assert_eq!(select("index 1-2 5"), vec![1, 2, 5]);
        assert_eq!(select("bynum 1:2"), vec![0, 1]);
        assert_eq!(select("resid 2"), vec![5]);
        assert_eq!(select("resid 1 to 2"), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(select("resid 1 and name N CA C O"), vec![0, 1, 2, 3]);
        assert_eq!(select("not protein"), vec![5]);
        assert_eq!(select("name CA or resname HOH"), vec![1, 5]);
        assert_eq!(select("not (backbone or name CB)"), vec![5]);
        assert_eq!(select("protein and not name C*"), vec![0, 3]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Selection::parse("name"),
            Err(SelectionError::MissingValues("name".to_string()))
        );
        assert_eq!(Selection::parse("(name CA"), Err(SelectionError::UnbalancedParentheses));
        assert_eq!(Selection::parse("name CA)"), Err(SelectionError::UnbalancedParentheses));
        assert_eq!(
            Selection::parse("index a"),
            Err(SelectionError::InvalidNumber("a".to_string()))
        );
        assert_eq!(
            Selection::parse("mass 12"),
            Err(SelectionError::UnexpectedToken("mass".to_string()))
        );
        assert_eq!(Selection::parse("name CA and"), Err(SelectionError::UnexpectedEnd));
    }
}
