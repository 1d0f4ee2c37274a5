use std::convert::Infallible;
use std::str::FromStr;

use itertools::Itertools;

use crate::result::{non_empty, OcrResult};

const RESULT_HEADER: &str = "\n===== OCR Result =====";
const TEXT_HEADER: &str = "\n--- Text ---";
const LATEX_HEADER: &str = "\n--- LaTeX ---";
const HTML_HEADER: &str = "\n--- HTML ---";
const RESPONSE_HEADER: &str = "\n--- Full Response ---";

/// Value of `--format`. Unrecognized names are kept and render nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Latex,
    Html,
    Json,
    Other(String),
}

impl FromStr for OutputFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => Self::Text,
            "latex" => Self::Latex,
            "html" => Self::Html,
            "json" => Self::Json,
            other => Self::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    TextOnly,
    Format(OutputFormat),
    FullDump,
}

impl OutputMode {
    /// `--text-only` beats `--format`; `--format text` is the full dump.
    pub fn select(text_only: bool, format: &OutputFormat) -> Self {
        if text_only {
            Self::TextOnly
        } else if *format != OutputFormat::Text {
            Self::Format(format.clone())
        } else {
            Self::FullDump
        }
    }
}

/// Renders what goes to stdout, or `None` when the mode has nothing to print.
pub fn render(result: &OcrResult, mode: &OutputMode) -> Option<String> {
    match mode {
        OutputMode::TextOnly => Some(result.extract_text_only()),
        OutputMode::Format(OutputFormat::Latex) => result.preferred_latex().map(str::to_string),
        OutputMode::Format(OutputFormat::Html) => non_empty(result.html()).map(str::to_string),
        OutputMode::Format(OutputFormat::Json) => Some(result.to_pretty_json()),
        OutputMode::Format(OutputFormat::Text | OutputFormat::Other(_)) => None,
        OutputMode::FullDump => Some(full_dump(result)),
    }
}

fn full_dump(result: &OcrResult) -> String {
    let section = |header: &str, body: Option<&str>| body.map(|body| format!("{header}\n{body}"));
    let response = result.to_pretty_json();

    [
        Some(RESULT_HEADER.to_string()),
        section(TEXT_HEADER, non_empty(result.text())),
        section(LATEX_HEADER, result.preferred_latex()),
        section(HTML_HEADER, non_empty(result.html())),
        section(RESPONSE_HEADER, Some(response.as_str())),
    ]
    .into_iter()
    .flatten()
    .join("\n")
}
