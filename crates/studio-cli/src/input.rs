//! Input document sources.

use crate::error::{CliError, Result};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// File extensions accepted for document upload
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "csv"];

/// Where the input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Pasted text
    Text(String),
    /// Fetched with HTTP GET
    Url(String),
    /// Local text file
    File(PathBuf),
    /// Piped standard input
    Stdin,
}

impl InputSource {
    /// Pick a source from the extract flags; stdin is used only when piped.
    pub fn from_args(text: Option<String>, url: Option<String>, file: Option<PathBuf>) -> Option<Self> {
        match (text, url, file) {
            (Some(text), _, _) => Some(InputSource::Text(text)),
            (_, Some(url), _) => Some(InputSource::Url(url)),
            (_, _, Some(path)) => Some(InputSource::File(path)),
            _ if !std::io::stdin().is_terminal() => Some(InputSource::Stdin),
            _ => None,
        }
    }

    /// Short description for status lines.
    pub fn describe(&self) -> String {
        match self {
            InputSource::Text(text) => format!("pasted text ({} chars)", text.chars().count()),
            InputSource::Url(url) => url.clone(),
            InputSource::File(path) => path.display().to_string(),
            InputSource::Stdin => "standard input".to_string(),
        }
    }

    /// Load the document text.
    ///
    /// Empty or whitespace-only documents are an input error.
    pub async fn load(&self) -> Result<String> {
        let text = match self {
            InputSource::Text(text) => text.clone(),
            InputSource::Url(url) => fetch_url(url).await?,
            InputSource::File(path) => read_file(path)?,
            InputSource::Stdin => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| CliError::Input(format!("Cannot read standard input: {}", e)))?;
                buffer
            }
        };

        if text.trim().is_empty() {
            return Err(CliError::Input(format!("Document from {} is empty", self.describe())));
        }
        Ok(text)
    }
}

async fn fetch_url(url: &str) -> Result<String> {
    info!(url, "Fetching document");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| CliError::Input(format!("Cannot create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CliError::Input(format!("Cannot fetch {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Input(format!("Fetching {} returned {}", url, status)));
    }

    response
        .text()
        .await
        .map_err(|e| CliError::Input(format!("Cannot read body of {}: {}", url, e)))
}

fn read_file(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CliError::Input(format!(
            "Unsupported file type '{}' (expected {})",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| CliError::Input(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
