use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_scroll_passes")]
    pub passes: u32,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Stop early once a pass yields no new identities.
    #[serde(default)]
    pub stop_when_exhausted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_item_selector")]
    pub item: String,
    #[serde(default = "default_text_selector")]
    pub text: String,
    #[serde(default = "default_author_selector")]
    pub author: String,
    #[serde(default = "default_time_selector")]
    pub time: String,
    #[serde(default = "default_permalink_selector")]
    pub permalink: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    Content,
    ContentWithTimestamp,
    #[default]
    StatusId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub identity: IdentityPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Order of the displayed matches. Every ordering is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    Collection,
    KeywordHits,
    HotspotScore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
    #[serde(default)]
    pub rank_by: RankBy,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotspotCategory {
    pub keywords: Vec<String>,
    /// Keyword to score weight, counted when the category matched.
    #[serde(default)]
    pub signals: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotspotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_hotspot_categories")]
    pub categories: BTreeMap<String, HotspotCategory>,
    #[serde(default = "default_activity_keywords")]
    pub activity_keywords: Vec<String>,
    #[serde(default = "default_hotspot_bonus")]
    pub activity_bonus: u32,
    #[serde(default = "default_official_keywords")]
    pub official_keywords: Vec<String>,
    #[serde(default = "default_hotspot_bonus")]
    pub official_bonus: u32,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    #[serde(default = "default_high_tier")]
    pub high_tier: u32,
    #[serde(default = "default_medium_tier")]
    pub medium_tier: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub dedup: DedupConfig,

    /// Topic label to keyword list.
    #[serde(default = "default_topics")]
    pub topics: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub hotspot: HotspotConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            filename: default_log_filename(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            passes: default_scroll_passes(),
            settle_delay_ms: default_settle_delay_ms(),
            stop_when_exhausted: false,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            text: default_text_selector(),
            author: default_author_selector(),
            time: default_time_selector(),
            permalink: default_permalink_selector(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_text_len: default_max_text_len(),
            base_url: default_base_url(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            preview_len: default_preview_len(),
            rank_by: RankBy::default(),
            format: ReportFormat::default(),
        }
    }
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            categories: default_hotspot_categories(),
            activity_keywords: default_activity_keywords(),
            activity_bonus: default_hotspot_bonus(),
            official_keywords: default_official_keywords(),
            official_bonus: default_hotspot_bonus(),
            max_score: default_max_score(),
            high_tier: default_high_tier(),
            medium_tier: default_medium_tier(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            extract: ExtractConfig::default(),
            dedup: DedupConfig::default(),
            topics: default_topics(),
            report: ReportConfig::default(),
            hotspot: HotspotConfig::default(),
            page: PageConfig::default(),
            run: RunConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::FileRead)?;
        let config = Self::from_toml(&content)?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scroll.passes == 0 {
            return Err(ConfigError::InvalidValue(
                "scroll.passes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.scroll.settle_delay_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "scroll.settle_delay_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.extract.max_text_len == 0 {
            return Err(ConfigError::InvalidValue(
                "extract.max_text_len must be greater than 0".to_string(),
            )
            .into());
        }

        if url::Url::parse(&self.extract.base_url).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "extract.base_url is not a valid URL: {}",
                self.extract.base_url
            ))
            .into());
        }

        if self.topics.is_empty() {
            return Err(ConfigError::MissingField("topics".to_string()).into());
        }

        for (label, keywords) in &self.topics {
            if label.trim().is_empty() {
                return Err(
                    ConfigError::InvalidValue("topic label cannot be empty".to_string()).into(),
                );
            }
            if keywords.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "topic '{}' has no keywords",
                    label
                ))
                .into());
            }
            // An empty keyword would match every record.
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "topic '{}' contains an empty keyword",
                    label
                ))
                .into());
            }
        }

        if self.report.display_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "report.display_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.report.preview_len == 0 {
            return Err(ConfigError::InvalidValue(
                "report.preview_len must be greater than 0".to_string(),
            )
            .into());
        }

        self.validate_hotspot()?;

        if self.page.snapshot_dir.is_empty() {
            return Err(
                ConfigError::InvalidValue("page.snapshot_dir cannot be empty".to_string()).into(),
            );
        }

        if self.run.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "run.timeout_secs must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    fn validate_hotspot(&self) -> Result<()> {
        let hotspot = &self.hotspot;
        if !hotspot.enabled {
            return Ok(());
        }

        if hotspot.medium_tier == 0
            || hotspot.medium_tier >= hotspot.high_tier
            || hotspot.high_tier > hotspot.max_score
        {
            return Err(ConfigError::InvalidValue(format!(
                "hotspot tiers must satisfy 0 < medium_tier ({}) < high_tier ({}) <= max_score ({})",
                hotspot.medium_tier, hotspot.high_tier, hotspot.max_score
            ))
            .into());
        }

        for (label, category) in &hotspot.categories {
            if category.keywords.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "hotspot category '{}' has no keywords",
                    label
                ))
                .into());
            }
            let keywords = category.keywords.iter().chain(category.signals.keys());
            if keywords.into_iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "hotspot category '{}' contains an empty keyword",
                    label
                ))
                .into());
            }
        }

        let bonus_keywords = hotspot.activity_keywords.iter().chain(&hotspot.official_keywords);
        if bonus_keywords.into_iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "hotspot bonus keywords cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_scroll_passes() -> u32 {
    5
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_max_text_len() -> usize {
    500
}

fn default_base_url() -> String {
    "https://x.com".to_string()
}

fn default_item_selector() -> String {
    r#"[data-testid="tweet"]"#.to_string()
}

fn default_text_selector() -> String {
    r#"[data-testid="tweetText"]"#.to_string()
}

fn default_author_selector() -> String {
    r#"[data-testid="User-Name"]"#.to_string()
}

fn default_time_selector() -> String {
    "time".to_string()
}

fn default_permalink_selector() -> String {
    r#"a[href*="/status/"]"#.to_string()
}

fn default_topics() -> BTreeMap<String, Vec<String>> {
    let topic = |label: &str, keywords: &[&str]| {
        (
            label.to_string(),
            keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
        )
    };

    BTreeMap::from([
        topic("AI", &["ai", "gpt", "llm", "agent"]),
        topic(
            "crypto",
            &[
                "crypto",
                "btc",
                "eth",
                "bitcoin",
                "ethereum",
                "solana",
                "web3",
                "blockchain",
                "token",
                "airdrop",
            ],
        ),
        topic("DeFi", &["defi", "yield", "restake"]),
        topic("NFT/meme", &["nft", "meme"]),
    ])
}

fn default_display_limit() -> usize {
    10
}

fn default_preview_len() -> usize {
    300
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn default_hotspot_categories() -> BTreeMap<String, HotspotCategory> {
    let high = [("launch", 3), ("airdrop", 2), ("whitelist", 2), ("coinlist", 2)];
    let medium = [("funding", 2), ("testnet", 1)];
    let low = [("launching", 1), ("mainnet", 1), ("v2", 1)];

    let category = |label: &str, keywords: &[&str], signals: &[(&str, u32)]| {
        (
            label.to_string(),
            HotspotCategory {
                keywords: words(keywords),
                signals: signals.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
            },
        )
    };

    BTreeMap::from([
        category(
            "airdrop",
            &["airdrop", "空投", "whitelist", "白名单", "claim", "领空"],
            &high,
        ),
        category(
            "new_project",
            &["launch", "launching", "首发", "mainnet", "测试网", "testnet", "v2"],
            &high,
        ),
        category(
            "funding",
            &[
                "funding", "融资", "投资", "investment", "round", "融资轮", "a轮", "b轮", "seed",
                "种子轮",
            ],
            &medium,
        ),
        category(
            "defi",
            &["defi", "yield", "质押", "restake", "流动性", "mining", "挖矿"],
            &low,
        ),
        category(
            "nft",
            &["nft", "白名单", "wl", "mint", "铸造", "发行", "blindbox", "盲盒"],
            &low,
        ),
        category(
            "token",
            &["token", "代币", "coin", "coinlist", "上所", "币安", "okx", "gate", "binance"],
            &low,
        ),
        category("layer2", &["layer2", "l2", "rollup", "zk", "layer3", "l3"], &low),
    ])
}

fn default_activity_keywords() -> Vec<String> {
    words(&["testnet", "测试网", "快照", "snapshot", "a1", "a2", "a3", "alpha"])
}

fn default_official_keywords() -> Vec<String> {
    words(&["official", "官方", "team", "团队", "dev", "开发"])
}

fn default_hotspot_bonus() -> u32 {
    2
}

fn default_max_score() -> u32 {
    10
}

fn default_high_tier() -> u32 {
    7
}

fn default_medium_tier() -> u32 {
    5
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_filename() -> String {
    "timeline-scout.log".to_string()
}
