use crate::config::{ReportConfig, ReportFormat};
use crate::error::Result;
use crate::pipeline::{HotspotTier, ScanResult, ScoredRecord, StopReason};
use crate::utils::truncate_chars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
pub struct ReportItem {
    pub rank: usize,
    pub author: String,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HotspotItem {
    pub rank: usize,
    /// Project name when one was quoted, else the author.
    pub title: String,
    pub score: u32,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airdrop_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_info: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct HotspotTiers {
    pub high: Vec<HotspotItem>,
    pub medium: Vec<HotspotItem>,
}

impl HotspotTiers {
    fn build(hotspots: &[ScoredRecord], config: &ReportConfig) -> Self {
        let section = |tier: HotspotTier| -> Vec<HotspotItem> {
            hotspots
                .iter()
                .filter(|scored| scored.hotspot.tier == Some(tier))
                .take(config.display_limit)
                .enumerate()
                .map(|(i, scored)| HotspotItem {
                    rank: i + 1,
                    title: scored
                        .hotspot
                        .project_name
                        .clone()
                        .unwrap_or_else(|| scored.record.author.clone()),
                    score: scored.hotspot.score,
                    preview: truncate_chars(&scored.record.text, config.preview_len).to_string(),
                    url: scored.record.url.clone(),
                    categories: scored.hotspot.categories.clone(),
                    airdrop_info: scored.hotspot.airdrop_info.clone(),
                    funding_info: scored.hotspot.funding_info.clone(),
                })
                .collect()
        };

        Self {
            high: section(HotspotTier::High),
            medium: section(HotspotTier::Medium),
        }
    }

    fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty()
    }
}

/// Display view of a scan. Items are capped; the tally covers every match.
#[derive(Debug, Serialize)]
pub struct Report {
    pub stop_reason: StopReason,
    pub passes_completed: u32,
    pub collected: usize,
    pub matched: usize,
    pub tally: BTreeMap<String, usize>,
    pub items: Vec<ReportItem>,
    pub hotspots: HotspotTiers,
}

impl Report {
    pub fn build(result: &ScanResult, config: &ReportConfig) -> Self {
        let items = result
            .classification
            .display(config.display_limit, config.rank_by)
            .into_iter()
            .enumerate()
            .map(|(i, matched)| ReportItem {
                rank: i + 1,
                author: matched.record.author.clone(),
                preview: truncate_chars(&matched.record.text, config.preview_len).to_string(),
                timestamp: matched.record.timestamp.clone(),
                url: matched.record.url.clone(),
                topics: matched.topics.clone(),
            })
            .collect();

        Self {
            stop_reason: result.outcome.stop_reason,
            passes_completed: result.outcome.passes_completed,
            collected: result.collection.len(),
            matched: result.classification.matched.len(),
            tally: result.classification.tally.clone(),
            items,
            hotspots: HotspotTiers::build(&result.hotspots, config),
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== {} relevant posts out of {} collected ({} passes, {}) ===",
            self.matched,
            self.collected,
            self.passes_completed,
            match self.stop_reason {
                StopReason::Completed => "completed",
                StopReason::Converged => "feed exhausted",
                StopReason::Cancelled => "cancelled",
            }
        );

        for item in &self.items {
            let _ = writeln!(out, "\n[{}] @{}  ({})", item.rank, item.author, item.topics.join(", "));
            if let Some(timestamp) = &item.timestamp {
                let _ = writeln!(out, "    {}", timestamp);
            }
            let _ = writeln!(out, "{}", item.preview);
            if let Some(url) = &item.url {
                let _ = writeln!(out, "{}", url);
            }
        }

        if self.matched > 0 {
            let _ = writeln!(out, "\nTopic distribution:");
            for (label, count) in self.tally.iter().filter(|(_, c)| **c > 0) {
                let _ = writeln!(out, "  {}: {}", label, count);
            }
        }

        if !self.hotspots.is_empty() {
            let sections = [
                ("High potential", &self.hotspots.high),
                ("Medium potential", &self.hotspots.medium),
            ];
            for (heading, items) in sections.into_iter().filter(|(_, items)| !items.is_empty()) {
                let _ = writeln!(out, "\n{} hotspots:", heading);
                for item in items {
                    let _ = writeln!(
                        out,
                        "  {}. {}  {}/10  ({})",
                        item.rank,
                        item.title,
                        item.score,
                        item.categories.join(", ")
                    );
                    if let Some(info) = &item.airdrop_info {
                        let _ = writeln!(out, "     airdrop: {}", info);
                    }
                    if let Some(info) = &item.funding_info {
                        let _ = writeln!(out, "     funding: {}", info);
                    }
                    let _ = writeln!(out, "     {}", item.preview);
                }
            }
        }

        out
    }
}
