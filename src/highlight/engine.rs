use std::sync::LazyLock;

use syntect::easy::ScopeRegionIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::{HighlightError, HighlightResult, LanguageId, Lexer, Token, TokenKind};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Scope prefixes checked innermost-first; the first hit decides the kind.
/// Order matters: delimiters before the generic punctuation rule and
/// `keyword.operator` before `keyword`.
const SCOPE_RULES: &[(&str, TokenKind)] = &[
    ("comment", TokenKind::Comment),
    ("punctuation.definition.comment", TokenKind::Comment),
    ("string", TokenKind::String),
    ("punctuation.definition.string", TokenKind::String),
    ("constant.numeric", TokenKind::Number),
    ("keyword.operator", TokenKind::Operator),
    ("keyword", TokenKind::Keyword),
    ("storage.type", TokenKind::Keyword),
    ("storage.modifier", TokenKind::Keyword),
    ("entity.name.function", TokenKind::Function),
    ("support.function", TokenKind::Function),
    ("variable.function", TokenKind::Function),
    ("punctuation", TokenKind::Punctuation),
];

/// Object keys and property names have no palette entry of their own; any
/// span inside one of these scopes is drawn as plain text, quotes included.
const PROPERTY_SCOPES: &[&str] = &[
    "meta.mapping.key.json",
    "meta.structure.dictionary.key.json",
    "support.type.property-name",
];

/// [`Lexer`] backed by syntect's bundled grammars.
#[derive(Debug, Clone, Copy)]
pub struct SyntectLexer {
    syntax_set: &'static SyntaxSet,
}

impl Default for SyntectLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectLexer {
    pub fn new() -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
        }
    }
}

impl Lexer for SyntectLexer {
    fn lex(&self, source: &str, language: LanguageId) -> HighlightResult<Vec<Token>> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language.syntax_token())
            .ok_or(HighlightError::MissingGrammar { language })?;

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens = Vec::new();

        for line in LinesWithEndings::from(source) {
            let ops = state
                .parse_line(line, self.syntax_set)
                .map_err(|err| HighlightError::Parse {
                    language,
                    message: format!("{err:?}"),
                })?;
            for (text, op) in ScopeRegionIterator::new(&ops, line) {
                stack.apply(op).map_err(|err| HighlightError::Parse {
                    language,
                    message: format!("{err:?}"),
                })?;
                if text.is_empty() {
                    continue;
                }
                tokens.push(Token::new(classify_stack(&stack), text));
            }
        }

        Ok(tokens)
    }
}

fn classify_stack(stack: &ScopeStack) -> TokenKind {
    let scopes = stack.as_slice();
    if scopes.iter().any(|scope| {
        let scope = scope.build_string();
        PROPERTY_SCOPES
            .iter()
            .any(|prefix| scope_has_prefix(&scope, prefix))
    }) {
        return TokenKind::Plain;
    }
    scopes
        .iter()
        .rev()
        .find_map(|scope| classify_scope(&scope.build_string()))
        .unwrap_or(TokenKind::Plain)
}

fn classify_scope(scope: &str) -> Option<TokenKind> {
    SCOPE_RULES
        .iter()
        .find(|(prefix, _)| scope_has_prefix(scope, prefix))
        .map(|(_, kind)| *kind)
}

fn scope_has_prefix(scope: &str, prefix: &str) -> bool {
    match scope.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
