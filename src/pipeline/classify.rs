use super::dedup::FeedCollection;
use super::hotspot::{Hotspot, HotspotScorer};
use super::record::FeedRecord;
use crate::config::RankBy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Topic label to lower-cased keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicVocabulary {
    topics: BTreeMap<String, BTreeSet<String>>,
}

impl TopicVocabulary {
    pub fn new<L, K, I>(topics: impl IntoIterator<Item = (L, I)>) -> Self
    where
        L: Into<String>,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let topics = topics
            .into_iter()
            .map(|(label, keywords)| {
                let keywords = keywords
                    .into_iter()
                    .map(|k| k.as_ref().trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (label.into(), keywords)
            })
            .collect();
        Self { topics }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRecord {
    pub record: FeedRecord,
    /// Every topic the record matched, in label order.
    pub topics: Vec<String>,
    /// Distinct keywords found in the text.
    pub keyword_hits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Relevant records in collection order.
    pub matched: Vec<MatchedRecord>,
    /// Matches per topic over the whole matched set. Topics are not
    /// exclusive, so the counts can sum past `matched.len()`.
    pub tally: BTreeMap<String, usize>,
}

impl Classification {
    /// Attach the hotspot analysis of every matched record.
    pub fn score_hotspots(&mut self, scorer: &HotspotScorer) {
        for matched in &mut self.matched {
            matched.hotspot = Some(scorer.analyze(&matched.record.text));
        }
    }

    /// The display slice: ranked (stable, so ties keep collection order) and
    /// capped at `limit`. Unscored records rank as score 0.
    pub fn display(&self, limit: usize, rank_by: RankBy) -> Vec<&MatchedRecord> {
        let mut shown: Vec<&MatchedRecord> = self.matched.iter().collect();
        match rank_by {
            RankBy::Collection => {}
            RankBy::KeywordHits => shown.sort_by(|a, b| b.keyword_hits.cmp(&a.keyword_hits)),
            RankBy::HotspotScore => shown.sort_by_key(|m| {
                std::cmp::Reverse(m.hotspot.as_ref().map_or(0, |h| h.score))
            }),
        }
        shown.truncate(limit);
        shown
    }
}

/// Tag every record against the vocabulary using case-insensitive substring
/// matching. A record is relevant when any keyword of any topic occurs.
pub fn classify(collection: &FeedCollection, vocabulary: &TopicVocabulary) -> Classification {
    let mut tally: BTreeMap<String, usize> =
        vocabulary.labels().map(|label| (label.to_string(), 0)).collect();
    let mut matched = Vec::new();

    for record in collection.iter() {
        let text = record.text.to_lowercase();
        let mut topics = Vec::new();
        let mut hits = BTreeSet::new();

        for (label, keywords) in &vocabulary.topics {
            let mut topic_hit = false;
            for keyword in keywords.iter().filter(|k| text.contains(k.as_str())) {
                hits.insert(keyword.as_str());
                topic_hit = true;
            }
            if topic_hit {
                topics.push(label.clone());
                *tally.entry(label.clone()).or_default() += 1;
            }
        }

        if !topics.is_empty() {
            matched.push(MatchedRecord {
                record: record.clone(),
                topics,
                keyword_hits: hits.len(),
                hotspot: None,
            });
        }
    }

    Classification { matched, tally }
}
