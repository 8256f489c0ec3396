mod timeline;

pub use timeline::{RawRecord, TimelineScraper};

use crate::config::SelectorConfig;
use crate::error::{Result, ScraperError};
use scraper::{Html, Selector};

/// Compiled CSS selectors locating feed items and their fields.
#[derive(Debug, Clone)]
pub struct FeedSelectors {
    pub item: Selector,
    pub text: Selector,
    pub author: Selector,
    pub time: Selector,
    pub permalink: Selector,
}

impl FeedSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            item: parse_selector(&config.item)?,
            text: parse_selector(&config.text)?,
            author: parse_selector(&config.author)?,
            time: parse_selector(&config.time)?,
            permalink: parse_selector(&config.permalink)?,
        })
    }
}

fn parse_selector(source: &str) -> Result<Selector> {
    Selector::parse(source)
        .map_err(|e| ScraperError::SelectorError(format!("{}: {}", source, e)).into())
}

pub struct Scraper {
    document: Html,
}

impl Scraper {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn timeline<'a>(&'a self, selectors: &'a FeedSelectors) -> TimelineScraper<'a> {
        TimelineScraper::new(&self.document, selectors)
    }
}
