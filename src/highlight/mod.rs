//! Tokenizer adapter: turns source text into classified spans.
//!
//! The lexical engine is reached through the [`Lexer`] trait so any
//! highlighting library can back it. [`tokenize`] never fails: an unknown
//! language id falls back to javascript and a lexer error degrades to one
//! plain token covering the whole input.

mod engine;
mod language;

use serde::Serialize;
use thiserror::Error;

pub use engine::SyntectLexer;
pub use language::LanguageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Comment,
    String,
    Keyword,
    Function,
    Number,
    Operator,
    Punctuation,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Plain, text)
    }
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no grammar available for {language}")]
    MissingGrammar { language: LanguageId },
    #[error("failed to parse {language} source: {message}")]
    Parse {
        language: LanguageId,
        message: String,
    },
}

pub type HighlightResult<T> = std::result::Result<T, HighlightError>;

pub trait Lexer {
    /// Classifies `source`. Implementations must cover every byte of the
    /// input, in order.
    fn lex(&self, source: &str, language: LanguageId) -> HighlightResult<Vec<Token>>;
}

pub fn tokenize<L: Lexer + ?Sized>(lexer: &L, source: &str, language_id: &str) -> Vec<Token> {
    tokenize_language(lexer, source, LanguageId::resolve(language_id))
}

pub fn tokenize_language<L: Lexer + ?Sized>(
    lexer: &L,
    source: &str,
    language: LanguageId,
) -> Vec<Token> {
    if source.is_empty() {
        return Vec::new();
    }
    match lexer.lex(source, language) {
        Ok(tokens) => merge_adjacent(tokens),
        Err(err) => {
            tracing::warn!(
                %err,
                grammar = language.grammar_name(),
                "syntax highlighting failed; rendering as plain text"
            );
            vec![Token::plain(source)]
        }
    }
}

/// Joins neighbouring spans of the same kind and drops empty spans.
pub(crate) fn merge_adjacent(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.kind == token.kind => last.text.push_str(&token.text),
            _ => merged.push(token),
        }
    }
    merged
}
