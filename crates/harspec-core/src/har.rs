//! HAR (HTTP Archive) entity model and loader.
//!
//! This module provides the subset of the HAR entity graph the generator
//! cares about, plus an async loader that reads a capture file from disk
//! under a fixed size ceiling. Unknown fields in the capture are ignored,
//! and no attempt is made to validate the file against the formal HAR
//! grammar; whatever deserializes is accepted.
//!
//! # Examples
//!
//! ```no_run
//! use harspec_core::har::HarDocument;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> harspec_core::error::Result<()> {
//! let cancel = CancellationToken::new();
//! let doc = HarDocument::from_file(&cancel, "capture.har").await?;
//! println!("{} entries", doc.log.entries.len());
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::Deserialize;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Upper bound on how much of a capture file is read (25 MiB). A capture
/// larger than this is rejected rather than silently truncated.
pub const MAX_HAR_BYTES: u64 = 25 << 20;

/// Top level structure of a HAR file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarDocument {
    #[serde(default)]
    pub log: HarLog,
}

/// The HAR log object details we care about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarLog {
    pub version: String,
    pub creator: Option<HarCreator>,
    pub entries: Vec<HarEntry>,
    pub pages: Vec<HarPage>,
}

/// Tool that produced the capture.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarCreator {
    pub name: String,
    pub version: String,
}

/// Metadata about a captured browser page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarPage {
    pub id: String,
    pub title: String,
    pub started_date_time: String,
    pub page_timings: Option<PageTimings>,
}

/// Page load timing metrics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageTimings {
    pub on_content_load: f64,
    pub on_load: f64,
}

/// A single captured HTTP exchange.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarEntry {
    pub pageref: String,
    pub started_date_time: String,
    pub time: f64,
    pub request: HarRequest,
    pub response: HarResponse,
}

/// Outbound request details of an entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    pub http_version: String,
    pub headers: Vec<NameValue>,
    pub query_string: Vec<NameValue>,
    pub post_data: Option<HarPostData>,
    pub cookies: Vec<NameValue>,
    pub headers_size: i64,
    pub body_size: i64,
}

/// Request payload recorded by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarPostData {
    pub mime_type: String,
    pub text: String,
    pub params: Vec<NameValue>,
}

/// Inbound response details of an entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarResponse {
    pub status: i64,
    pub status_text: String,
    pub http_version: String,
    pub headers: Vec<NameValue>,
    pub cookies: Vec<NameValue>,
    pub content: HarContent,
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    pub headers_size: i64,
    pub body_size: i64,
    #[serde(rename = "_transferSize")]
    pub transfer_size: i64,
}

/// Response body details of an entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarContent {
    pub size: i64,
    pub mime_type: String,
    pub text: String,
}

/// Reusable name/value pair used for headers, query params and cookies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl HarDocument {
    /// Load a HAR capture from disk.
    ///
    /// At most [`MAX_HAR_BYTES`] are read; a larger file is an error.
    /// Cancellation is observed after the read, before the parse step.
    pub async fn from_file<P: AsRef<Path>>(
        cancel: &CancellationToken,
        path: P,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .await
            .map_err(|e| Error::har(format!("open HAR file {}: {}", path.display(), e)))?;

        let data = read_capped(file, MAX_HAR_BYTES).await?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let doc: HarDocument = serde_json::from_slice(&data)?;
        Ok(doc)
    }
}

/// Read at most `limit` bytes from `reader`; anything beyond that is an
/// error so oversized input never masquerades as a valid (truncated) parse.
async fn read_capped<R>(reader: R, limit: u64) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    let mut capped = reader.take(limit + 1);
    capped.read_to_end(&mut data).await?;

    if data.len() as u64 > limit {
        return Err(Error::har(format!(
            "HAR file exceeds the {limit} byte read limit"
        )));
    }

    Ok(data)
}
