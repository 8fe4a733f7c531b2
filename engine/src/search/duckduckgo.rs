//! DuckDuckGo Instant Answer provider
//!
//! The instant answer API returns at most one abstract plus a list of
//! related topics. The abstract becomes the first result, followed by the
//! first five related topics that carry both text and a URL.

use async_trait::async_trait;
use sdk::{EngineError, SearchProvider, SearchResult};
use serde::Deserialize;
use std::time::Duration;

use super::{endpoint, fetch_json, http_client};
use crate::config::ProviderConfig;

const NAME: &str = "DuckDuckGo";
const MAX_RELATED_TOPICS: usize = 5;
const ICON_HOST: &str = "https://duckduckgo.com";

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,

    #[serde(rename = "Heading", default)]
    heading: String,

    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,

    #[serde(rename = "Image", default)]
    image: String,

    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

// Category groups in RelatedTopics have `Name` and `Topics` instead of
// `Text`/`FirstURL`; they deserialize with both left empty and are skipped.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,

    #[serde(rename = "FirstURL")]
    first_url: Option<String>,

    #[serde(rename = "Icon")]
    icon: Option<TopicIcon>,
}

#[derive(Debug, Deserialize)]
struct TopicIcon {
    #[serde(rename = "URL", default)]
    url: String,
}

pub struct DuckDuckGoProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, EngineError> {
        Ok(Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            client: http_client(config.timeout())?,
        })
    }

    fn into_results(answer: InstantAnswer) -> Vec<SearchResult> {
        let mut results = Vec::new();

        if !answer.abstract_text.is_empty() && !answer.abstract_url.is_empty() {
            let title = if answer.heading.is_empty() {
                "Instant Answer".to_string()
            } else {
                answer.heading
            };
            let mut result = SearchResult::new(title, answer.abstract_url, answer.abstract_text);
            if let Some(icon) = icon_url(&answer.image) {
                result = result.with_favicon(icon);
            }
            results.push(result);
        }

        for topic in answer.related_topics.into_iter().take(MAX_RELATED_TOPICS) {
            let (Some(text), Some(url)) = (topic.text, topic.first_url) else {
                continue;
            };
            if text.is_empty() || url.is_empty() {
                continue;
            }

            let title = text.split(" - ").next().unwrap_or(&text).to_string();
            let mut result = SearchResult::new(title, url, text);
            if let Some(icon) = topic.icon.as_ref().and_then(|i| icon_url(&i.url)) {
                result = result.with_favicon(icon);
            }
            results.push(result);
        }

        results
    }
}

/// Icon paths in the API are relative to the main site
fn icon_url(path: &str) -> Option<String> {
    if path.is_empty() {
        None
    } else if path.starts_with('/') {
        Some(format!("{}{}", ICON_HOST, path))
    } else {
        Some(path.to_string())
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
        let url = endpoint(&self.base_url, "");
        let answer: InstantAnswer = fetch_json(
            &self.client,
            NAME,
            &url,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .await?;

        Ok(Self::into_results(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<SearchResult> {
        let answer: InstantAnswer = serde_json::from_str(json).unwrap();
        DuckDuckGoProvider::into_results(answer)
    }

    #[test]
    fn test_abstract_then_topics() {
        let results = parse(
            r#"{
                "Abstract": "Rust is a systems language.",
                "Heading": "Rust (programming language)",
                "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
                "Image": "/i/rust.png",
                "RelatedTopics": [
                    {"Text": "Cargo - The Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo",
                     "Icon": {"URL": "", "Height": "", "Width": ""}},
                    {"Name": "See also", "Topics": []},
                    {"Text": "Ferris - Mascot", "FirstURL": "https://duckduckgo.com/Ferris"}
                ]
            }"#,
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust (programming language)");
        assert_eq!(
            results[0].favicon_url.as_deref(),
            Some("https://duckduckgo.com/i/rust.png")
        );
        assert_eq!(results[1].title, "Cargo");
        assert_eq!(results[1].snippet, "Cargo - The Rust package manager");
        assert!(results[1].favicon_url.is_none());
        assert_eq!(results[2].url, "https://duckduckgo.com/Ferris");
    }

    #[test]
    fn test_only_first_five_topics_considered() {
        let topics: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"Text": "T{i}", "FirstURL": "https://x/{i}"}}"#))
            .collect();
        let results = parse(&format!(r#"{{"RelatedTopics": [{}]}}"#, topics.join(",")));
        assert_eq!(results.len(), 5);
        assert_eq!(results[4].url, "https://x/4");
    }

    #[test]
    fn test_empty_answer() {
        assert!(parse("{}").is_empty());
        assert!(parse(r#"{"Abstract": "", "RelatedTopics": []}"#).is_empty());
    }
}
