use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Response payload of the `v3/text` endpoint.
///
/// Only `text`, `latex_styled`, `latex` and `html` are interpreted; every
/// other field is kept in provider order so the full dump shows the
/// response as it was received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OcrResult(Map<String, Value>);

impl OcrResult {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn text(&self) -> Option<&str> {
        self.field("text")
    }

    pub fn latex_styled(&self) -> Option<&str> {
        self.field("latex_styled")
    }

    pub fn latex(&self) -> Option<&str> {
        self.field("latex")
    }

    pub fn html(&self) -> Option<&str> {
        self.field("html")
    }

    /// `latex_styled` when non-empty, otherwise `latex` when non-empty.
    pub fn preferred_latex(&self) -> Option<&str> {
        non_empty(self.latex_styled()).or_else(|| non_empty(self.latex()))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The whole result as JSON indented by two spaces.
    pub fn to_pretty_json(&self) -> String {
        // Serializing a map of `Value`s cannot fail.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    /// Best single piece of text for `--text-only`.
    pub fn extract_text_only(&self) -> String {
        if let Some(text) = non_blank(self.text()) {
            return text.to_string();
        }
        if let Some(latex) = non_blank(self.latex_styled()).or_else(|| non_blank(self.latex())) {
            return latex.to_string();
        }
        if let Some(html) = non_blank(self.html()) {
            return strip_tags(html);
        }
        self.to_pretty_json()
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Deletes every `<...>` run. Not an HTML parser: nesting, comments and
/// entities are left alone.
pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Blank means only whitespace or byte order marks, which `str::trim` keeps.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}').is_empty())
}
