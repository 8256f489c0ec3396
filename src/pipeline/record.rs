use crate::config::{ExtractConfig, IdentityPolicy};
use crate::error::{ConfigError, Result};
use crate::scraper::{FeedSelectors, RawRecord, Scraper};
use crate::utils::truncate_chars;
use crate::log_debug;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

/// Author recorded when the name anchor is missing from a feed item.
pub const UNKNOWN_AUTHOR: &str = "unknown";

static STATUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("status id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedRecord {
    pub author: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
}

/// Key under which two sightings count as the same post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Status(String),
    Content {
        author: String,
        text: String,
    },
    ContentAt {
        author: String,
        text: String,
        timestamp: Option<String>,
    },
}

impl FeedRecord {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp: None,
            url: None,
            status_id: None,
        }
    }

    /// Every key this record is known under. A record matching any key of an
    /// earlier record is the same post.
    ///
    /// Under `StatusId` a record with a permalink carries both its status key
    /// and its content key, so a sighting rendered before its permalink still
    /// collapses onto the later one. Empty text is left out of the content key
    /// there; otherwise every media-only post by one author would collide.
    pub fn identities(&self, policy: IdentityPolicy) -> Vec<Identity> {
        let content = || Identity::Content {
            author: self.author.clone(),
            text: self.text.clone(),
        };

        match (policy, &self.status_id) {
            (IdentityPolicy::StatusId, Some(id)) if self.text.is_empty() => {
                vec![Identity::Status(id.clone())]
            }
            (IdentityPolicy::StatusId, Some(id)) => vec![Identity::Status(id.clone()), content()],
            (IdentityPolicy::ContentWithTimestamp, _) => vec![Identity::ContentAt {
                author: self.author.clone(),
                text: self.text.clone(),
                timestamp: self.timestamp.clone(),
            }],
            _ => vec![content()],
        }
    }
}

/// Turns the rendered document into validated [`FeedRecord`]s.
pub struct RecordExtractor {
    selectors: FeedSelectors,
    max_text_len: usize,
    base_url: Url,
}

impl RecordExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::InvalidValue(format!("extract.base_url {}: {}", config.base_url, e))
        })?;

        Ok(Self {
            selectors: FeedSelectors::compile(&config.selectors)?,
            max_text_len: config.max_text_len,
            base_url,
        })
    }

    pub fn extract_batch(&self, html: &str) -> Vec<FeedRecord> {
        let scraper = Scraper::new(html);
        scraper
            .timeline(&self.selectors)
            .extract_visible_records()
            .into_iter()
            .filter_map(|raw| self.validate(raw))
            .collect()
    }

    fn validate(&self, raw: RawRecord) -> Option<FeedRecord> {
        if raw.text.is_none() && raw.author.is_none() && raw.permalink.is_none() {
            log_debug!("[extract] Dropping feed item with no text, author or permalink");
            return None;
        }

        let text = raw.text.unwrap_or_else(|| {
            log_debug!("[extract] Feed item has no text anchor");
            String::new()
        });

        let author = raw.author.unwrap_or_else(|| {
            log_debug!("[extract] Feed item has no author anchor");
            UNKNOWN_AUTHOR.to_string()
        });

        let (url, status_id) = match raw.permalink.as_deref() {
            Some(href) => (
                self.base_url.join(href).ok().map(String::from),
                STATUS_ID
                    .captures(href)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string()),
            ),
            None => (None, None),
        };

        Some(FeedRecord {
            timestamp: raw.timestamp,
            url,
            status_id,
            ..FeedRecord::new(author, truncate_chars(&text, self.max_text_len))
        })
    }
}
