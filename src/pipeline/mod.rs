mod cancel;
mod classify;
mod dedup;
mod hotspot;
mod record;
mod scroll;
#[cfg(test)]
mod testing;

pub use cancel::{cancel_pair, CancelSignal, Canceller};
pub use classify::{classify, Classification, TopicVocabulary};
pub use dedup::FeedCollection;
pub use hotspot::{HotspotScorer, HotspotTier, ScoredRecord};
pub use record::RecordExtractor;
pub use scroll::{ScrollDriver, ScrollOutcome, StopReason};
#[cfg(test)]
pub use record::FeedRecord;

use crate::config::{Config, IdentityPolicy};
use crate::error::Result;
use crate::page::PageHandle;
use crate::{log_debug, log_info};

/// Everything one scan produced. A cancelled or converged scan still carries
/// the records gathered up to its last completed pass.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub collection: FeedCollection,
    pub classification: Classification,
    /// Tiered hotspots over the whole collection, highest score first.
    pub hotspots: Vec<ScoredRecord>,
    pub outcome: ScrollOutcome,
}

/// A configured scroll, extract, dedupe and classify pipeline.
pub struct Scan {
    driver: ScrollDriver,
    extractor: RecordExtractor,
    identity: IdentityPolicy,
    vocabulary: TopicVocabulary,
    hotspots: Option<HotspotScorer>,
}

impl Scan {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            driver: ScrollDriver::new(&config.scroll),
            extractor: RecordExtractor::new(&config.extract)?,
            identity: config.dedup.identity,
            vocabulary: TopicVocabulary::new(config.topics.iter()),
            hotspots: config
                .hotspot
                .enabled
                .then(|| HotspotScorer::new(&config.hotspot)),
        })
    }

    /// Scroll `page`, fold each settled batch into one collection, then
    /// classify it. Only a failing page handle produces an error.
    pub async fn run<P>(&self, page: &mut P, cancel: &CancelSignal) -> Result<ScanResult>
    where
        P: PageHandle + ?Sized,
    {
        let mut collection = FeedCollection::new(self.identity);

        let outcome = self
            .driver
            .run(page, cancel, |pass, html| {
                let batch = self.extractor.extract_batch(html);
                let seen = batch.len();
                let added = collection.merge(batch);

                if seen == 0 {
                    log_info!("[scan] Pass {} yielded no records", pass);
                } else {
                    log_info!(
                        "[scan] Pass {}: {} records visible, {} new, {} total",
                        pass,
                        seen,
                        added,
                        collection.len()
                    );
                }
                added
            })
            .await?;

        if collection.is_empty() {
            log_info!("[scan] No records collected");
        }

        let mut classification = classify(&collection, &self.vocabulary);
        log_debug!(
            "[scan] {} of {} records matched the vocabulary",
            classification.matched.len(),
            collection.len()
        );

        let hotspots = match &self.hotspots {
            Some(scorer) => {
                classification.score_hotspots(scorer);
                let hotspots = scorer.rank(collection.iter());
                log_debug!("[scan] {} records reached a hotspot tier", hotspots.len());
                hotspots
            }
            None => Vec::new(),
        };

        Ok(ScanResult {
            collection,
            classification,
            hotspots,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedPage;
    use std::collections::BTreeMap;

    fn tweet(author: &str, text: &str) -> String {
        format!(
            r#"<article data-testid="tweet"><div data-testid="User-Name">{}</div><div data-testid="tweetText">{}</div></article>"#,
            author, text
        )
    }

    fn frame(tweets: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", tweets.concat())
    }

    fn config(passes: u32) -> Config {
        let mut config = Config::from_toml(
            r#"
            [topics]
            AI = ["ai", "gpt"]
            crypto = ["btc", "eth"]
            "#,
        )
        .unwrap();
        config.scroll.passes = passes;
        config.scroll.settle_delay_ms = 1;
        config
    }

    fn frames() -> Vec<String> {
        vec![
            frame(&[tweet("a", "new GPT model launches"), tweet("b", "BTC hits new high")]),
            frame(&[
                tweet("b", "BTC hits new high"),
                tweet("c", "lunch"),
                tweet("a", "new GPT model launches"),
            ]),
            frame(&[tweet("d", "eth and ai agents")]),
        ]
    }

    #[tokio::test]
    async fn scans_dedupes_and_classifies() {
        let scan = Scan::from_config(&config(3)).unwrap();
        let mut page = ScriptedPage::new(frames());

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        assert_eq!(result.outcome.stop_reason, StopReason::Completed);
        let texts: Vec<_> = result.collection.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["new GPT model launches", "BTC hits new high", "lunch", "eth and ai agents"]
        );
        assert_eq!(
            result.classification.tally,
            BTreeMap::from([("AI".to_string(), 2), ("crypto".to_string(), 2)])
        );
        assert_eq!(result.classification.matched.len(), 3);
    }

    #[tokio::test]
    async fn empty_passes_complete_without_error() {
        let scan = Scan::from_config(&config(3)).unwrap();
        let empty = "<html><body><main></main></body></html>";
        let mut page = ScriptedPage::new(vec![empty; 3]);

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        assert!(result.collection.is_empty());
        assert_eq!(result.outcome.passes_completed, 3);
        assert_eq!(result.outcome.stop_reason, StopReason::Completed);
        assert!(result.classification.matched.is_empty());
    }

    #[tokio::test]
    async fn cancellation_returns_collection_of_completed_passes() {
        let scan = Scan::from_config(&config(3)).unwrap();

        let mut uncancelled = ScriptedPage::new(frames());
        let two_passes = Scan::from_config(&config(2))
            .unwrap()
            .run(&mut uncancelled, &CancelSignal::never())
            .await
            .unwrap();

        let (canceller, signal) = cancel_pair();
        let mut page = ScriptedPage::new(frames()).cancel_on_suspend(3, canceller);
        let cancelled = scan.run(&mut page, &signal).await.unwrap();

        assert_eq!(cancelled.outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(cancelled.outcome.passes_completed, 2);
        assert_eq!(cancelled.collection, two_passes.collection);
    }

    #[tokio::test]
    async fn convergence_stops_when_feed_is_exhausted() {
        let mut config = config(5);
        config.scroll.stop_when_exhausted = true;
        let scan = Scan::from_config(&config).unwrap();
        let mut page = ScriptedPage::new(frames());

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        // The third frame is repeated by the fourth scroll.
        assert_eq!(result.outcome.stop_reason, StopReason::Converged);
        assert_eq!(result.outcome.passes_completed, 4);
        assert_eq!(result.collection.len(), 4);
    }

    #[tokio::test]
    async fn scans_bundled_snapshots() {
        let mut config = Config::default();
        config.scroll.passes = 3;
        config.scroll.settle_delay_ms = 1;
        let scan = Scan::from_config(&config).unwrap();
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/snapshots");
        let mut page = crate::page::SnapshotPage::open(dir).unwrap();

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        assert_eq!(result.collection.len(), 4);
        assert_eq!(result.classification.matched.len(), 3);
        assert_eq!(result.classification.tally["crypto"], 2);
        assert_eq!(result.classification.tally["DeFi"], 1);
        assert_eq!(result.classification.tally["AI"], 1);
        assert_eq!(
            result.collection.iter().next().and_then(|r| r.url.as_deref()),
            Some("https://x.com/vfan/status/1790000000000000001")
        );
    }

    #[tokio::test]
    async fn scores_hotspots_over_the_whole_collection() {
        let scan = Scan::from_config(&config(2)).unwrap();
        let mut page = ScriptedPage::new(vec![
            frame(&[
                tweet("a", "Official launch of 'Zeta', airdrop whitelist: ZETA1"),
                tweet("b", "gm"),
            ]),
            frame(&[tweet("c", "launch on testnet")]),
        ]);

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        let hotspots: Vec<_> = result
            .hotspots
            .iter()
            .map(|h| (h.record.author.as_str(), h.hotspot.tier))
            .collect();
        assert_eq!(
            hotspots,
            vec![("a", Some(HotspotTier::High)), ("c", Some(HotspotTier::Medium))]
        );
        // None of them matches the AI / crypto vocabulary.
        assert!(result.classification.matched.is_empty());
    }

    #[tokio::test]
    async fn disabled_hotspots_leave_matches_unscored() {
        let mut config = config(3);
        config.hotspot.enabled = false;
        let scan = Scan::from_config(&config).unwrap();
        let mut page = ScriptedPage::new(frames());

        let result = scan.run(&mut page, &CancelSignal::never()).await.unwrap();

        assert!(result.hotspots.is_empty());
        assert!(result.classification.matched.iter().all(|m| m.hotspot.is_none()));
    }

    #[tokio::test]
    async fn closed_handle_is_fatal() {
        let scan = Scan::from_config(&config(3)).unwrap();
        let mut page = ScriptedPage::new(frames()).fail_on_scroll(2);

        let err = scan.run(&mut page, &CancelSignal::never()).await.unwrap_err();
        assert!(err.is_handle_unavailable());
    }

    #[tokio::test]
    async fn lost_render_aborts_the_scan() {
        let scan = Scan::from_config(&config(3)).unwrap();
        let mut page = ScriptedPage::new(frames()).fail_on_render(3);

        let err = scan.run(&mut page, &CancelSignal::never()).await.unwrap_err();
        assert!(err.is_handle_unavailable());
        assert_eq!(page.scrolls, 3);
    }
}
