//! Supported snippet languages and their grammar lookup keys.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    #[default]
    Javascript,
    Python,
    Java,
    Css,
    Html,
    Json,
    Sql,
    Bash,
}

impl LanguageId {
    pub const ALL: [LanguageId; 8] = [
        LanguageId::Javascript,
        LanguageId::Python,
        LanguageId::Java,
        LanguageId::Css,
        LanguageId::Html,
        LanguageId::Json,
        LanguageId::Sql,
        LanguageId::Bash,
    ];

    /// Exact lookup of a UI language id. Surrounding whitespace and ASCII case
    /// are ignored.
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(id))
    }

    /// Like [`LanguageId::parse`], but unknown ids map to javascript.
    pub fn resolve(id: &str) -> Self {
        Self::parse(id).unwrap_or_else(|| {
            tracing::debug!(language = id, "unsupported language id; using javascript");
            Self::default()
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Css => "css",
            Self::Html => "html",
            Self::Json => "json",
            Self::Sql => "sql",
            Self::Bash => "bash",
        }
    }

    /// Grammar family name; html is highlighted with the markup grammar.
    pub const fn grammar_name(self) -> &'static str {
        match self {
            Self::Html => "markup",
            other => other.as_str(),
        }
    }

    /// Token accepted by `SyntaxSet::find_syntax_by_token`.
    pub const fn syntax_token(self) -> &'static str {
        match self {
            Self::Javascript => "js",
            Self::Python => "py",
            Self::Java => "java",
            Self::Css => "css",
            Self::Html => "html",
            Self::Json => "json",
            Self::Sql => "sql",
            Self::Bash => "sh",
        }
    }

    /// Extension shown in the window chrome label.
    pub const fn label_extension(self) -> &'static str {
        match self {
            Self::Javascript => "js",
            Self::Python => "py",
            _ => "txt",
        }
    }

    pub fn chrome_label(self) -> String {
        format!("{}.{}", self.as_str(), self.label_extension())
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_supported_id() {
        for language in LanguageId::ALL {
            assert_eq!(LanguageId::parse(language.as_str()), Some(language));
        }
        assert_eq!(LanguageId::parse(" Python "), Some(LanguageId::Python));
    }

    #[test]
    fn resolve_maps_unknown_ids_to_javascript() {
        assert_eq!(LanguageId::resolve("cobol"), LanguageId::Javascript);
        assert_eq!(LanguageId::resolve(""), LanguageId::Javascript);
    }

    #[test]
    fn html_uses_markup_grammar() {
        assert_eq!(LanguageId::Html.grammar_name(), "markup");
        assert_eq!(LanguageId::Sql.grammar_name(), "sql");
    }

    #[test]
    fn chrome_label_uses_short_extension_for_js_and_py_only() {
        assert_eq!(LanguageId::Javascript.chrome_label(), "javascript.js");
        assert_eq!(LanguageId::Python.chrome_label(), "python.py");
        assert_eq!(LanguageId::Html.chrome_label(), "html.txt");
        assert_eq!(LanguageId::Bash.chrome_label(), "bash.txt");
    }
}
