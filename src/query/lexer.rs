//! Tokenizer for boolean query strings.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{MalformedReason, QuarryError, Result};
use crate::index::key::TermKey;

/// A lexical unit of a boolean query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The whitespace-separated tokens of a quoted phrase.
    Phrase(Vec<String>),
    LParen,
    RParen,
    And,
    Or,
    Not,
    /// A bare run of non-space, non-parenthesis characters.
    Operand(String),
}

impl Token {
    /// The index key an operand token resolves to.
    pub fn key(&self) -> Option<TermKey> {
        match self {
            Token::Operand(term) => Some(TermKey::term(term.as_str())),
            Token::Phrase(tokens) => Some(TermKey::from_tokens(tokens.iter().map(String::as_str))),
            _ => None,
        }
    }

    /// Whether this token is a term or phrase.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Operand(_) | Token::Phrase(_))
    }
}

/// Splits a boolean query into [`Token`]s.
///
/// `AND`, `OR` and `NOT` are operators only when they form a whole bare run;
/// `ANDROID` or `NOTE` stay operands.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(query: &'a str) -> Self {
        Lexer {
            chars: query.chars().peekable(),
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => {
                self.chars.next();
                Token::LParen
            }
            ')' => {
                self.chars.next();
                Token::RParen
            }
            '"' => self.read_phrase()?,
            _ => {
                let word = self.read_word();
                match word.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Operand(word),
                }
            }
        };
        Ok(Some(token))
    }

    fn read_phrase(&mut self) -> Result<Token> {
        // Opening quote
        self.chars.next();

        let mut phrase = String::new();
        loop {
            match self.chars.next() {
                Some('"') => break,
                Some(c) => phrase.push(c),
                None => return Err(QuarryError::malformed(MalformedReason::UnmatchedQuotes)),
            }
        }

        Ok(Token::Phrase(
            phrase.split_whitespace().map(str::to_string).collect(),
        ))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            word.push(c);
            self.chars.next();
        }
        word
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }
}

/// Tokenize `query` with a fresh [`Lexer`].
pub fn tokenize(query: &str) -> Result<Vec<Token>> {
    Lexer::new(query).tokenize()
}
