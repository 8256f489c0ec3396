use super::FeedSelectors;
use crate::utils::normalize_whitespace;
use crate::{log_debug, log_info};
use scraper::{ElementRef, Html};

/// One feed item as found in the rendered document. Every field is
/// best-effort; a missing anchor leaves the field `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub author: Option<String>,
    pub text: Option<String>,
    pub timestamp: Option<String>,
    pub permalink: Option<String>,
}

/// Read-only view over the currently rendered feed items.
pub struct TimelineScraper<'a> {
    document: &'a Html,
    selectors: &'a FeedSelectors,
}

impl<'a> TimelineScraper<'a> {
    pub(crate) fn new(document: &'a Html, selectors: &'a FeedSelectors) -> Self {
        Self {
            document,
            selectors,
        }
    }

    pub fn extract_visible_records(&self) -> Vec<RawRecord> {
        let records = self
            .document
            .select(&self.selectors.item)
            .map(|item| self.extract_record(item))
            .collect::<Vec<_>>();

        if records.is_empty() {
            log_info!("[scraper] No feed items rendered");
        } else {
            log_debug!("[scraper] Found {} rendered feed items", records.len());
        }

        records
    }

    fn extract_record(&self, item: ElementRef) -> RawRecord {
        RawRecord {
            author: self.extract_author(&item),
            text: self.extract_text(&item),
            timestamp: self.extract_timestamp(&item),
            permalink: self.extract_permalink(&item),
        }
    }

    fn extract_text(&self, item: &ElementRef) -> Option<String> {
        let text = item
            .select(&self.selectors.text)
            .next()?
            .text()
            .collect::<String>();
        Some(text.trim().to_string())
    }

    fn extract_author(&self, item: &ElementRef) -> Option<String> {
        // Display name and handle, without the "· 2h" age rendered beside them.
        let block = item.select(&self.selectors.author).next()?;
        let parts = block
            .descendants()
            .filter(|node| {
                !node
                    .ancestors()
                    .any(|a| a.value().as_element().is_some_and(|e| e.name() == "time"))
            })
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim())
            .filter(|text| !text.is_empty() && *text != "·")
            .collect::<Vec<_>>()
            .join(" ");
        let author = normalize_whitespace(&parts);
        (!author.is_empty()).then_some(author)
    }

    fn extract_timestamp(&self, item: &ElementRef) -> Option<String> {
        item.select(&self.selectors.time)
            .next()?
            .value()
            .attr("datetime")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn extract_permalink(&self, item: &ElementRef) -> Option<String> {
        item.select(&self.selectors.permalink)
            .next()?
            .value()
            .attr("href")
            .map(str::to_string)
    }
}
