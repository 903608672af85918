use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of notes requested when the caller does not say.
pub const DEFAULT_COUNT: u32 = 10;

/// Failure raised by a [`ContentFetcher`] while retrieving or parsing notes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream status {0}")]
    Status(u16),
    #[error("unexpected upstream format: {0}")]
    Parse(String),
    #[error("{0} not configured; set it to enable search_xiaohongshu")]
    NotConfigured(&'static str),
    #[error("{0}")]
    Message(String),
}

impl FetchError {
    pub fn message(msg: impl Into<String>) -> Self {
        FetchError::Message(msg.into())
    }

    /// Transport failures and 5xx answers are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// Invalid tool arguments, rejected before any fetch happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: query")]
    MissingQuery,
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("count must be a positive integer, got {0}")]
    InvalidCount(String),
}

/// One retrieved note with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_desc: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collects: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub link: String,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            author_desc: None,
            content: content.into(),
            likes: None,
            collects: None,
            comments: None,
            images: Vec::new(),
            tags: Vec::new(),
            link: link.into(),
        }
    }

    pub fn with_author_desc(mut self, desc: impl Into<String>) -> Self {
        self.author_desc = Some(desc.into());
        self
    }

    pub fn with_likes(mut self, likes: u64) -> Self {
        self.likes = Some(likes);
        self
    }

    pub fn with_collects(mut self, collects: u64) -> Self {
        self.collects = Some(collects);
        self
    }

    pub fn with_comments(mut self, comments: u64) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// True when at least one interaction metric was reported upstream.
    pub fn has_interactions(&self) -> bool {
        self.likes.is_some() || self.collects.is_some() || self.comments.is_some()
    }
}

/// Validated arguments of one `search_xiaohongshu` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub count: u32,
}

impl SearchRequest {
    /// Validate raw tool arguments. A missing or null `count` falls back to
    /// [`DEFAULT_COUNT`]; zero, negative, fractional or non-numeric counts are
    /// rejected rather than clamped.
    pub fn from_arguments(
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or(ValidationError::MissingQuery)?;
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let count = match args.get("count") {
            None | Some(serde_json::Value::Null) => DEFAULT_COUNT,
            Some(v) => parse_count(v).ok_or_else(|| ValidationError::InvalidCount(v.to_string()))?,
        };

        Ok(Self {
            query: query.to_owned(),
            count,
        })
    }
}

fn parse_count(v: &serde_json::Value) -> Option<u32> {
    let n = match v.as_u64() {
        Some(n) => n,
        // JSON clients often send integral floats such as 5.0
        None => {
            let f = v.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 {
                return None;
            }
            f as u64
        }
    };
    if n == 0 {
        return None;
    }
    u32::try_from(n).ok()
}

/// The seam to the platform-facing retrieval step.
///
/// Implementations own their latency bounds, retries and sessions; callers
/// make exactly one call per request and either get every note in source
/// order or a single [`FetchError`].
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync + 'static {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Note>, FetchError>;
}
