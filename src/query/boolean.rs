//! Boolean query evaluation over posting sets.
//!
//! Queries are tokenized, converted to postfix with the shunting-yard
//! algorithm and evaluated on a stack of document sets. `NOT` is resolved
//! against a local universe: the union of the postings of every operand in
//! the query, not the whole corpus.

use std::collections::BTreeSet;

use log::debug;

use crate::error::{QuarryError, Result};
use crate::index::key::TermKey;
use crate::index::package::{DocId, IndexReader};
use crate::query::detector;
use crate::query::lexer::{self, Token};

/// Boolean operators in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
    Not,
}

impl Operator {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Not => 3,
        }
    }

    /// Whether equal-precedence operators group to the right.
    pub fn is_right_associative(self) -> bool {
        matches!(self, Operator::Not)
    }

    fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::And => Some(Operator::And),
            Token::Or => Some(Operator::Or),
            Token::Not => Some(Operator::Not),
            _ => None,
        }
    }
}

/// One item of a postfix program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixItem {
    Operand(TermKey),
    Operator(Operator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackEntry {
    Operator(Operator),
    LParen,
}

/// Convert an infix token stream to postfix.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<PostfixItem>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackEntry> = Vec::new();

    for token in tokens {
        if let Some(key) = token.key() {
            output.push(PostfixItem::Operand(key));
            continue;
        }

        match token {
            Token::LParen => stack.push(StackEntry::LParen),
            Token::RParen => loop {
                match stack.pop() {
                    Some(StackEntry::Operator(op)) => output.push(PostfixItem::Operator(op)),
                    Some(StackEntry::LParen) => break,
                    None => return Err(QuarryError::expression("unbalanced ')'")),
                }
            },
            _ => {
                let Some(current) = Operator::from_token(token) else {
                    continue;
                };
                while let Some(&StackEntry::Operator(top)) = stack.last() {
                    let pops = top.precedence() > current.precedence()
                        || (top.precedence() == current.precedence()
                            && !current.is_right_associative());
                    if !pops {
                        break;
                    }
                    stack.pop();
                    output.push(PostfixItem::Operator(top));
                }
                stack.push(StackEntry::Operator(current));
            }
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Operator(op) => output.push(PostfixItem::Operator(op)),
            StackEntry::LParen => return Err(QuarryError::expression("unbalanced '('")),
        }
    }

    Ok(output)
}

/// Evaluates boolean queries against an index.
#[derive(Debug, Clone, Copy)]
pub struct BooleanEvaluator<'a> {
    reader: &'a dyn IndexReader,
}

impl<'a> BooleanEvaluator<'a> {
    pub fn new(reader: &'a dyn IndexReader) -> Self {
        BooleanEvaluator { reader }
    }

    /// Validate, parse and evaluate `query`.
    pub fn evaluate(&self, query: &str) -> Result<BTreeSet<DocId>> {
        detector::validate_boolean(query)?;
        let tokens = lexer::tokenize(query)?;
        let postfix = to_postfix(&tokens)?;
        let universe = self.universe(&postfix);

        debug!(
            "boolean query {query:?}: {} postfix items, universe of {}",
            postfix.len(),
            universe.len()
        );

        self.evaluate_postfix(&postfix, &universe)
    }

    /// Union of the postings of every operand in the program.
    fn universe(&self, postfix: &[PostfixItem]) -> BTreeSet<DocId> {
        let mut seen: BTreeSet<&TermKey> = BTreeSet::new();
        let mut universe = BTreeSet::new();
        for item in postfix {
            if let PostfixItem::Operand(key) = item {
                if seen.insert(key) {
                    universe.extend(self.reader.posting_list(key).iter().copied());
                }
            }
        }
        universe
    }

    fn evaluate_postfix(
        &self,
        postfix: &[PostfixItem],
        universe: &BTreeSet<DocId>,
    ) -> Result<BTreeSet<DocId>> {
        let mut stack: Vec<BTreeSet<DocId>> = Vec::new();

        for item in postfix {
            match item {
                PostfixItem::Operand(key) => {
                    stack.push(self.reader.posting_list(key).iter().copied().collect());
                }
                PostfixItem::Operator(Operator::Not) => {
                    let operand = stack
                        .pop()
                        .ok_or_else(|| QuarryError::expression("NOT without an operand"))?;
                    stack.push(universe.difference(&operand).copied().collect());
                }
                PostfixItem::Operator(op) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(QuarryError::expression(format!(
                            "{op:?} needs two operands"
                        )));
                    };
                    let combined = match op {
                        Operator::And => left.intersection(&right).copied().collect(),
                        _ => left.union(&right).copied().collect(),
                    };
                    stack.push(combined);
                }
            }
        }

        let Some(result) = stack.pop() else {
            return Err(QuarryError::expression("expression has no operands"));
        };
        if !stack.is_empty() {
            return Err(QuarryError::expression(format!(
                "{} operands left without an operator",
                stack.len() + 1
            )));
        }
        Ok(result)
    }
}
