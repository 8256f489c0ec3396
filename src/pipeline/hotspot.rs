use super::record::FeedRecord;
use crate::config::HotspotConfig;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["'『【]([A-Za-z0-9]+)["'』】]"#).expect("project name pattern is valid")
});

static AIRDROP_INFO: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?i)(?:白名单|whitelist)\s*[:：]\s*([a-z0-9]+)",
        r"(?i)claim\s*[:：]\s*([a-z0-9]+)",
        r"(?i)空投.*?[:：]\s*([a-z0-9]+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("airdrop pattern is valid"))
});

static FUNDING_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\$\s*[\d.,]+)\s*(万|million|billion)").expect("funding pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotTier {
    Medium,
    High,
}

/// What the scorer found in one post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hotspot {
    pub categories: Vec<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<HotspotTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airdrop_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord {
    pub record: FeedRecord,
    pub hotspot: Hotspot,
}

#[derive(Debug, Clone)]
struct Category {
    keywords: Vec<String>,
    signals: BTreeMap<String, u32>,
}

/// Scores posts for launch, airdrop and funding potential.
#[derive(Debug, Clone)]
pub struct HotspotScorer {
    categories: BTreeMap<String, Category>,
    activity_keywords: Vec<String>,
    activity_bonus: u32,
    official_keywords: Vec<String>,
    official_bonus: u32,
    max_score: u32,
    high_tier: u32,
    medium_tier: u32,
}

fn lowered(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.trim().to_lowercase()).collect()
}

impl HotspotScorer {
    pub fn new(config: &HotspotConfig) -> Self {
        let categories = config
            .categories
            .iter()
            .map(|(label, category)| {
                let signals = category
                    .signals
                    .iter()
                    .map(|(k, w)| (k.trim().to_lowercase(), *w))
                    .collect();
                (
                    label.clone(),
                    Category {
                        keywords: lowered(&category.keywords),
                        signals,
                    },
                )
            })
            .collect();

        Self {
            categories,
            activity_keywords: lowered(&config.activity_keywords),
            activity_bonus: config.activity_bonus,
            official_keywords: lowered(&config.official_keywords),
            official_bonus: config.official_bonus,
            max_score: config.max_score,
            high_tier: config.high_tier,
            medium_tier: config.medium_tier,
        }
    }

    pub fn analyze(&self, text: &str) -> Hotspot {
        let lower = text.to_lowercase();
        let contains_any = |keywords: &[String]| keywords.iter().any(|k| lower.contains(k.as_str()));

        let matched: Vec<(&String, &Category)> = self
            .categories
            .iter()
            .filter(|(_, category)| contains_any(&category.keywords))
            .collect();

        // A signal shared by several matched categories counts once, at its
        // highest weight.
        let mut signals: BTreeMap<&str, u32> = BTreeMap::new();
        for (_, category) in &matched {
            for (keyword, weight) in &category.signals {
                let entry = signals.entry(keyword.as_str()).or_default();
                *entry = (*entry).max(*weight);
            }
        }
        let mut score: u32 = signals
            .iter()
            .filter(|(keyword, _)| lower.contains(**keyword))
            .map(|(_, weight)| weight)
            .sum();

        if contains_any(&self.activity_keywords) {
            score += self.activity_bonus;
        }
        if contains_any(&self.official_keywords) {
            score += self.official_bonus;
        }
        let score = score.min(self.max_score);

        let has = |label: &str| matched.iter().any(|(l, _)| l.as_str() == label);
        let airdrop_info = if has("airdrop") {
            AIRDROP_INFO
                .iter()
                .find_map(|pattern| pattern.captures(text))
                .map(|c| c[1].to_string())
        } else {
            None
        };
        let funding_info = if has("funding") {
            FUNDING_INFO
                .captures(text)
                .map(|c| format!("{} {}", c[1].replace(' ', ""), &c[2]))
        } else {
            None
        };

        Hotspot {
            categories: matched.iter().map(|(label, _)| label.to_string()).collect(),
            score,
            tier: self.tier(score),
            project_name: PROJECT_NAME.captures(text).map(|c| c[1].to_string()),
            airdrop_info,
            funding_info,
        }
    }

    fn tier(&self, score: u32) -> Option<HotspotTier> {
        if score >= self.high_tier {
            Some(HotspotTier::High)
        } else if score >= self.medium_tier {
            Some(HotspotTier::Medium)
        } else {
            None
        }
    }

    /// Tiered records only, highest score first. Equal scores keep
    /// collection order.
    pub fn rank<'a>(&self, records: impl IntoIterator<Item = &'a FeedRecord>) -> Vec<ScoredRecord> {
        let mut scored: Vec<ScoredRecord> = records
            .into_iter()
            .map(|record| ScoredRecord {
                hotspot: self.analyze(&record.text),
                record: record.clone(),
            })
            .filter(|scored| scored.hotspot.tier.is_some())
            .collect();
        scored.sort_by(|a, b| b.hotspot.score.cmp(&a.hotspot.score));
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> HotspotScorer {
        HotspotScorer::new(&HotspotConfig::default())
    }

    #[test]
    fn launch_with_whitelist_scores_high_and_caps() {
        let hotspot =
            scorer().analyze("Official launch of 'Zeta' airdrop, whitelist: ZETA1 on testnet");

        assert_eq!(hotspot.categories, vec!["airdrop", "new_project"]);
        // launch 3 + airdrop 2 + whitelist 2, activity 2, official 2
        assert_eq!(hotspot.score, 10);
        assert_eq!(hotspot.tier, Some(HotspotTier::High));
        assert_eq!(hotspot.project_name.as_deref(), Some("Zeta"));
        assert_eq!(hotspot.airdrop_info.as_deref(), Some("ZETA1"));
        assert_eq!(hotspot.funding_info, None);
    }

    #[test]
    fn launch_on_testnet_is_medium() {
        let hotspot = scorer().analyze("launch on testnet");
        assert_eq!(hotspot.categories, vec!["new_project"]);
        assert_eq!(hotspot.score, 5);
        assert_eq!(hotspot.tier, Some(HotspotTier::Medium));
    }

    #[test]
    fn extracts_funding_amount() {
        let hotspot = scorer().analyze("Acme raises $5.5 million seed round");
        assert_eq!(hotspot.categories, vec!["funding"]);
        assert_eq!(hotspot.funding_info.as_deref(), Some("$5.5 million"));
        assert_eq!(hotspot.score, 0);
        assert_eq!(hotspot.tier, None);
    }

    #[test]
    fn extracts_chinese_airdrop_claim() {
        let hotspot = scorer().analyze("【Nova】空投开启，领取码：NOVA88");
        assert_eq!(hotspot.project_name.as_deref(), Some("Nova"));
        assert_eq!(hotspot.airdrop_info.as_deref(), Some("NOVA88"));
    }

    #[test]
    fn plain_chatter_scores_nothing() {
        assert_eq!(scorer().analyze("gm, coffee first"), Hotspot::default());
    }

    #[test]
    fn weights_and_tiers_are_configurable() {
        let config = HotspotConfig {
            high_tier: 4,
            medium_tier: 2,
            ..HotspotConfig::default()
        };
        let hotspot = HotspotScorer::new(&config).analyze("launch on testnet");
        assert_eq!(hotspot.tier, Some(HotspotTier::High));
    }

    #[test]
    fn rank_keeps_tiered_records_by_score() {
        let records = vec![
            FeedRecord::new("a", "gm"),
            FeedRecord::new("b", "launch on testnet"),
            FeedRecord::new("c", "Official launch, airdrop whitelist open on testnet"),
            FeedRecord::new("d", "launch on testnet too"),
        ];
        let ranked = scorer().rank(&records);
        let authors: Vec<_> = ranked.iter().map(|s| s.record.author.as_str()).collect();
        assert_eq!(authors, vec!["c", "b", "d"]);
    }
}
