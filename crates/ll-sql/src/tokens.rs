//! Tagged token stream built on sqlparser's tokenizer
//!
//! sqlparser yields a flat list of words and punctuation. Table extraction
//! needs a coarser view: keywords (with multi-word `JOIN` phrases collapsed),
//! identifiers carrying their alias, comma-separated identifier lists, and
//! everything else. [`TokenStream`] groups raw tokens into [`SqlToken`]s so the
//! extractor can run a plain state-machine scan over an explicit enum.

use sqlparser::tokenizer::{Token, Word};

use crate::dialect::SqlDialect;
use crate::error::SqlResult;

/// Keywords that shape statement structure. Any other word, including
/// sqlparser keywords such as `USER` or `COUNT`, may act as a name.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CONFLICT", "CREATE", "CROSS", "DEFAULT",
    "DELETE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "EXISTS", "FETCH", "FOR", "FROM",
    "FULL", "GROUP", "HAVING", "IF", "ILIKE", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS",
    "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "MERGE", "NATURAL", "NOT", "NOTHING", "NULL",
    "OFFSET", "ON", "OR", "ORDER", "OUTER", "QUALIFY", "REPLACE", "RETURNING", "RIGHT", "SELECT",
    "SET", "TABLE", "TEMP", "TEMPORARY", "THEN", "UNION", "UPDATE", "USING", "VALUES", "VIEW",
    "WHEN", "WHERE", "WINDOW", "WITH",
];

/// Words that may open a join phrase such as `LEFT OUTER JOIN`.
const JOIN_MODIFIERS: &[&str] = &["CROSS", "FULL", "INNER", "LEFT", "NATURAL", "OUTER", "RIGHT"];

/// Data-manipulation keywords used to classify a statement.
const DML_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE"];

/// Keywords after which `name(` is a table with a column list, not a call.
const TABLE_TARGET_KEYWORDS: &[&str] = &["INTO", "TABLE", "UPDATE"];

/// One grouped token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlToken {
    /// Structural keyword, uppercased. Join phrases are a single keyword
    /// (`"LEFT OUTER JOIN"`).
    Keyword(String),
    /// Dotted name with an optional alias: `orders`, `sales.orders o`,
    /// `orders as o`.
    Identifier(String),
    /// Two or more identifiers separated by commas.
    IdentifierList(Vec<String>),
    /// A run of whitespace or comments.
    Whitespace,
    /// Anything else: punctuation, literals, operators, function names,
    /// parenthesized groups.
    Other(String),
}

impl SqlToken {
    /// Whether this is the given (uppercase) keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, SqlToken::Keyword(k) if k == keyword)
    }

    /// Whether this is any `JOIN` variant.
    pub fn is_join_keyword(&self) -> bool {
        matches!(self, SqlToken::Keyword(k) if k == "JOIN" || k.ends_with(" JOIN"))
    }

    /// Whether this is whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, SqlToken::Whitespace)
    }
}

/// Statement classification by first DML keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    /// Another DML keyword came first, or none was found.
    Other,
}

/// A grouped token stream for one piece of SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<SqlToken>,
}

impl TokenStream {
    /// Tokenize SQL with the given dialect and group the result.
    pub fn tokenize(sql: &str, dialect: &dyn SqlDialect) -> SqlResult<Self> {
        let raw = dialect.tokenize(sql)?;
        Ok(Self::from_raw_tokens(&raw))
    }

    /// Group already-tokenized input.
    pub fn from_raw_tokens(raw: &[Token]) -> Self {
        Grouper::new(raw).group()
    }

    /// The grouped tokens.
    pub fn tokens(&self) -> &[SqlToken] {
        &self.tokens
    }

    /// Iterate over the grouped tokens.
    pub fn iter(&self) -> std::slice::Iter<'_, SqlToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Classify the statement by its first DML keyword.
    pub fn statement_kind(&self) -> StatementKind {
        let first_dml = self.tokens.iter().find_map(|t| match t {
            SqlToken::Keyword(k) if DML_KEYWORDS.contains(&k.as_str()) => Some(k.as_str()),
            _ => None,
        });
        match first_dml {
            Some("SELECT") => StatementKind::Select,
            Some("INSERT") => StatementKind::Insert,
            Some("UPDATE") => StatementKind::Update,
            _ => StatementKind::Other,
        }
    }
}

impl<'s> IntoIterator for &'s TokenStream {
    type Item = &'s SqlToken;
    type IntoIter = std::slice::Iter<'s, SqlToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

fn is_structural(word: &Word) -> bool {
    word.quote_style.is_none()
        && STRUCTURAL_KEYWORDS.contains(&word.value.to_uppercase().as_str())
}

fn is_unquoted(word: &Word, keyword: &str) -> bool {
    word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword)
}

/// Single-pass grouper over raw tokens.
struct Grouper<'a> {
    raw: &'a [Token],
    pos: usize,
    out: Vec<SqlToken>,
}

impl<'a> Grouper<'a> {
    fn new(raw: &'a [Token]) -> Self {
        Self {
            raw,
            pos: 0,
            out: Vec::new(),
        }
    }

    fn at(&self, idx: usize) -> Option<&'a Token> {
        let raw = self.raw;
        raw.get(idx)
    }

    fn skip_whitespace(&self, mut idx: usize) -> usize {
        while matches!(self.at(idx), Some(Token::Whitespace(_))) {
            idx += 1;
        }
        idx
    }

    fn group(mut self) -> TokenStream {
        while let Some(token) = self.at(self.pos) {
            match token {
                Token::EOF => self.pos += 1,
                Token::Whitespace(_) => {
                    if !matches!(self.out.last(), Some(SqlToken::Whitespace)) {
                        self.out.push(SqlToken::Whitespace);
                    }
                    self.pos += 1;
                }
                Token::LParen => {
                    let text = self.take_parenthesized();
                    self.out.push(SqlToken::Other(text));
                }
                Token::Word(word) if is_structural(word) => self.group_keyword(word),
                Token::Word(word) => self.group_identifiers(word),
                other => {
                    self.out.push(SqlToken::Other(other.to_string()));
                    self.pos += 1;
                }
            }
        }
        TokenStream { tokens: self.out }
    }

    fn group_keyword(&mut self, word: &Word) {
        let upper = word.value.to_uppercase();
        if upper == "JOIN" || JOIN_MODIFIERS.contains(&upper.as_str()) {
            if let Some((phrase, next)) = self.scan_join_phrase() {
                self.out.push(SqlToken::Keyword(phrase));
                self.pos = next;
                return;
            }
        }
        if upper == "IS" {
            if let Some((phrase, next)) = self.scan_distinct_phrase() {
                self.out.push(SqlToken::Keyword(phrase));
                self.pos = next;
                return;
            }
        }
        self.out.push(SqlToken::Keyword(upper));
        self.pos += 1;
    }

    /// Collect the comparison `IS [NOT] DISTINCT FROM` starting at the current
    /// position, so its `FROM` never opens a table list.
    fn scan_distinct_phrase(&self) -> Option<(String, usize)> {
        let mut parts = vec!["IS"];
        let mut idx = self.skip_whitespace(self.pos + 1);
        if let Some(Token::Word(w)) = self.at(idx) {
            if is_unquoted(w, "NOT") {
                parts.push("NOT");
                idx = self.skip_whitespace(idx + 1);
            }
        }
        for keyword in ["DISTINCT", "FROM"] {
            match self.at(idx) {
                Some(Token::Word(w)) if is_unquoted(w, keyword) => parts.push(keyword),
                _ => return None,
            }
            idx = if keyword == "FROM" {
                idx + 1
            } else {
                self.skip_whitespace(idx + 1)
            };
        }
        Some((parts.join(" "), idx))
    }

    /// Collect `[NATURAL] [INNER|LEFT|RIGHT|FULL|CROSS] [OUTER] JOIN` starting
    /// at the current position.
    fn scan_join_phrase(&self) -> Option<(String, usize)> {
        let mut parts: Vec<String> = Vec::new();
        let mut idx = self.pos;
        loop {
            match self.at(idx) {
                Some(Token::Word(w)) if is_unquoted(w, "JOIN") => {
                    parts.push("JOIN".to_string());
                    return Some((parts.join(" "), idx + 1));
                }
                Some(Token::Word(w))
                    if w.quote_style.is_none()
                        && JOIN_MODIFIERS.contains(&w.value.to_uppercase().as_str()) =>
                {
                    parts.push(w.value.to_uppercase());
                    idx = self.skip_whitespace(idx + 1);
                }
                _ => return None,
            }
        }
    }

    fn group_identifiers(&mut self, word: &Word) {
        let Some((first, mut next)) = self.scan_identifier(self.pos) else {
            self.out.push(SqlToken::Other(word.to_string()));
            self.pos += 1;
            return;
        };

        let mut items = vec![first];
        loop {
            let comma = self.skip_whitespace(next);
            if !matches!(self.at(comma), Some(Token::Comma)) {
                break;
            }
            let candidate = self.skip_whitespace(comma + 1);
            match self.at(candidate) {
                Some(Token::Word(w)) if !is_structural(w) => {}
                _ => break,
            }
            match self.scan_identifier(candidate) {
                Some((item, after)) => {
                    items.push(item);
                    next = after;
                }
                None => break,
            }
        }

        self.pos = next;
        if items.len() == 1 {
            self.out.push(SqlToken::Identifier(items.remove(0)));
        } else {
            self.out.push(SqlToken::IdentifierList(items));
        }
    }

    /// Read a dotted name plus optional alias starting at `start`.
    ///
    /// Returns `None` for a function call (`name(` outside a table target
    /// position).
    fn scan_identifier(&self, start: usize) -> Option<(String, usize)> {
        let Some(Token::Word(head)) = self.at(start) else {
            return None;
        };
        let mut parts = vec![head.to_string()];
        let mut idx = start + 1;
        while let (Some(Token::Period), Some(Token::Word(part))) = (self.at(idx), self.at(idx + 1))
        {
            parts.push(part.to_string());
            idx += 2;
        }
        let name = parts.join(".");

        if matches!(self.at(idx), Some(Token::LParen)) && !self.follows_table_target() {
            return None;
        }

        let alias_start = self.skip_whitespace(idx);
        match self.at(alias_start) {
            Some(Token::Word(w)) if is_unquoted(w, "AS") => {
                let alias_idx = self.skip_whitespace(alias_start + 1);
                if let Some(Token::Word(alias)) = self.at(alias_idx) {
                    if !is_structural(alias) {
                        return Some((format!("{name} as {alias}"), alias_idx + 1));
                    }
                }
            }
            Some(Token::Word(alias)) if !is_structural(alias) => {
                return Some((format!("{name} {alias}"), alias_start + 1));
            }
            _ => {}
        }
        Some((name, idx))
    }

    fn follows_table_target(&self) -> bool {
        match self.out.iter().rev().find(|t| !t.is_whitespace()) {
            Some(SqlToken::Keyword(k)) => TABLE_TARGET_KEYWORDS.contains(&k.as_str()),
            _ => false,
        }
    }

    /// Consume a balanced parenthesized group and return its text.
    fn take_parenthesized(&mut self) -> String {
        let mut depth = 0usize;
        let mut text = String::new();
        while let Some(token) = self.at(self.pos) {
            self.pos += 1;
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::EOF => break,
                _ => {}
            }
            text.push_str(&token.to_string());
            if depth == 0 {
                break;
            }
        }
        text
    }
}

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tests;
