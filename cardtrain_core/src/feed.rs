//! Card feed loading.
//!
//! The feed is a JSON document of the form
//! `{ "cards": [ { "src": "cards/01.jpg" }, ... ] }`. Parsing is lenient: a
//! missing or non-array `cards` field is an empty feed, and an entry without a
//! string `src` still becomes a (blank) card slot.

use crate::error::FeedError;
use cardtrain_env::{CardDescriptor, FeedSource};
use serde_json::Value;
use tracing::{info, warn};

/// Parses feed JSON into card descriptors.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<CardDescriptor>, FeedError> {
    let doc: Value = serde_json::from_slice(bytes)?;

    let cards = match doc.get("cards") {
        Some(Value::Array(cards)) => cards,
        _ => return Ok(Vec::new()),
    };

    Ok(cards
        .iter()
        .map(|entry| match entry.get("src") {
            Some(Value::String(src)) => CardDescriptor::new(src.clone()),
            _ => CardDescriptor::empty(),
        })
        .collect())
}

/// Fetches and parses the feed.
pub async fn fetch_feed<F: FeedSource + ?Sized>(source: &F) -> Result<Vec<CardDescriptor>, FeedError> {
    let bytes = source.fetch_feed().await?;
    parse_feed(&bytes)
}

/// Fetches the feed, substituting an empty list on any failure.
pub async fn load_feed_or_empty<F: FeedSource + ?Sized>(source: &F) -> Vec<CardDescriptor> {
    match fetch_feed(source).await {
        Ok(cards) => {
            info!(cards = cards.len(), "card feed loaded");
            cards
        }
        Err(e) => {
            warn!(error = %e, "card feed unavailable, starting with an empty rail");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardtrain_env::EnvError;

    struct StaticFeed(Result<&'static str, EnvError>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch_feed(&self) -> Result<Vec<u8>, EnvError> {
            self.0.clone().map(|s| s.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_feed(br#"{ "cards": [ { "src": "a.jpg" }, { "src": "b/c.png" } ] }"#).unwrap();
        assert_eq!(cards, vec![CardDescriptor::new("a.jpg"), CardDescriptor::new("b/c.png")]);
    }

    #[test]
    fn test_entry_without_src_keeps_slot() {
        let cards = parse_feed(br#"{ "cards": [ { "src": "a.jpg" }, {}, { "src": 5 }, null ] }"#).unwrap();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[1], CardDescriptor::empty());
        assert_eq!(cards[2], CardDescriptor::empty());
        assert_eq!(cards[3], CardDescriptor::empty());
    }

    #[test]
    fn test_non_array_cards_is_empty() {
        assert!(parse_feed(br#"{ "cards": "nope" }"#).unwrap().is_empty());
        assert!(parse_feed(br#"{}"#).unwrap().is_empty());
        assert!(parse_feed(br#"[1, 2, 3]"#).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(parse_feed(b"{ cards: "), Err(FeedError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_empty() {
        let feed = StaticFeed(Err(EnvError::feed("offline")));
        assert!(load_feed_or_empty(&feed).await.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_falls_back_to_empty() {
        let feed = StaticFeed(Ok("<html>not json</html>"));
        assert!(load_feed_or_empty(&feed).await.is_empty());
    }

    #[tokio::test]
    async fn test_good_feed_loads() {
        let feed = StaticFeed(Ok(r#"{ "cards": [ { "src": "x.webp" } ] }"#));
        let cards = load_feed_or_empty(&feed).await;
        assert_eq!(cards, vec![CardDescriptor::new("x.webp")]);
    }
}
