use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;

use crate::format::OutputFormat;
use crate::{OcrError, Result};

pub const USAGE: &str =
    "usage: mathpix-ocr <image-path> [--text-only] [--format text|latex|html|json]";

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Parser, Debug)]
#[command(name = "mathpix-ocr", version, args_override_self = true)]
#[command(about = "Recognize text, LaTeX and HTML in an image with the Mathpix OCR API")]
pub struct Cli {
    /// Image to recognize (PNG, JPG or JPEG)
    pub image: Option<PathBuf>,

    #[arg(hide = true)]
    pub extra: Vec<OsString>,

    /// Print only the best text extraction
    #[arg(long)]
    pub text_only: bool,

    /// Output format: text, latex, html or json
    #[arg(long, value_name = "FORMAT", default_value = "text", allow_hyphen_values = true)]
    pub format: String,

    /// Seconds to wait for the OCR API
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub timeout: u64,
}

impl Cli {
    /// Like `try_parse_from`, but flags clap does not know are dropped
    /// instead of rejected.
    pub fn parse_lenient<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        loop {
            match Self::try_parse_from(&args) {
                Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                    let Some(unknown) = unknown_argument(&err) else {
                        return Err(err);
                    };
                    // Index 0 is the program name.
                    let Some(index) = args
                        .iter()
                        .skip(1)
                        .position(|arg| is_spelling_of(arg, &unknown))
                    else {
                        return Err(err);
                    };
                    tracing::debug!("ignoring unknown argument {unknown}");
                    args.remove(index + 1);
                }
                parsed => return parsed,
            }
        }
    }
}

fn unknown_argument(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg)? {
        ContextValue::String(arg) => Some(arg.clone()),
        _ => None,
    }
}

/// `flag` is what clap reports: `--name` for longs, `-c` for a short, even
/// when the short sits inside a cluster such as `-vc`.
fn is_spelling_of(arg: &OsStr, flag: &str) -> bool {
    let Some(arg) = arg.to_str() else {
        return false;
    };
    if arg == flag || arg.starts_with(&format!("{flag}=")) {
        return true;
    }
    match flag.strip_prefix('-') {
        Some(short) if !short.is_empty() && !short.starts_with('-') => {
            !arg.starts_with("--") && arg.strip_prefix('-').is_some_and(|c| c.contains(short))
        }
        _ => false,
    }
}

/// One fully parsed run of the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub image_path: PathBuf,
    pub text_only: bool,
    pub output_format: OutputFormat,
    pub timeout: Duration,
}

impl TryFrom<Cli> for Invocation {
    type Error = OcrError;

    fn try_from(cli: Cli) -> Result<Self> {
        let image_path = cli
            .image
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| OcrError::Usage(USAGE.to_string()))?;

        Ok(Self {
            image_path,
            text_only: cli.text_only,
            output_format: cli.format.parse().unwrap_or_default(),
            timeout: Duration::from_secs(cli.timeout),
        })
    }
}

/// Case-insensitive check against the formats the API is known to accept.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}
