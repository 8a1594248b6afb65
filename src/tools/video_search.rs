//! Video search tool implementation using the YouTube Data API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;

use super::utils::{fetch_json, require_text};
use super::{ToolHandler, ToolKind};

const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com";
const YOUTUBE_SEARCH_PATH: &str = "/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

const MAX_RESULTS: i64 = 10;
const DEFAULT_RESULTS: i64 = 2;

#[derive(Debug, Deserialize)]
struct VideoSearchArgs {
    query: String,
    count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
}

pub struct VideoSearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VideoSearch {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            base_url: YOUTUBE_API_BASE_URL.to_string(),
            api_key,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// One line per video: title, channel and watch link.
fn format_videos(response: SearchResponse) -> String {
    let lines: Vec<String> = response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            Some(format!(
                "{} ({}): {WATCH_URL}{video_id}",
                item.snippet.title, item.snippet.channel_title
            ))
        })
        .collect();

    if lines.is_empty() {
        "No videos found".to_string()
    } else {
        lines.join("\n")
    }
}

#[async_trait]
impl ToolHandler for VideoSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::VideoSearch
    }

    fn description(&self) -> &'static str {
        "Search YouTube for videos and return their titles and links. \
        Use when the user asks for a video or a song."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                },
                "count": {
                    "type": "integer",
                    "description": "Number of videos to return (1-10, default 2)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: VideoSearchArgs = serde_json::from_str(arguments)?;
        let query = require_text(&args.query, "query")?;
        let count = args
            .count
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS)
            .to_string();

        debug!("Searching videos for: {query}");

        let url = format!("{}{YOUTUBE_SEARCH_PATH}", self.base_url);
        let response: SearchResponse = fetch_json(self.client.get(url).query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", count.as_str()),
            ("q", query),
            ("key", self.api_key.as_str()),
        ]))
        .await?;

        Ok(format_videos(response))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn execute_queries_videos_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(YOUTUBE_SEARCH_PATH))
            .and(query_param("part", "snippet"))
            .and(query_param("type", "video"))
            .and(query_param("maxResults", "2"))
            .and(query_param("q", "lofi beats"))
            .and(query_param("key", "yt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": {"videoId": "abc123"},
                    "snippet": {"title": "Lofi", "channelTitle": "Chill"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = VideoSearch::new(Client::new(), "yt-key".to_string())
            .with_base_url(server.uri())
            .execute(r#"{"query": "lofi beats"}"#)
            .await
            .unwrap();

        assert_eq!(output, "Lofi (Chill): https://www.youtube.com/watch?v=abc123");
    }

    #[tokio::test]
    async fn oversized_count_is_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let output = VideoSearch::new(Client::new(), "yt-key".to_string())
            .with_base_url(server.uri())
            .execute(r#"{"query": "lofi", "count": 1000}"#)
            .await
            .unwrap();

        assert_eq!(output, "No videos found");
    }

    #[test]
    fn videos_are_listed_with_links() {
        let response: SearchResponse = serde_json::from_value(json!({
            "items": [
                {
                    "id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"},
                    "snippet": {"title": "Never Gonna Give You Up", "channelTitle": "Rick Astley"}
                },
                {
                    "id": {"kind": "youtube#channel", "channelId": "UC123"},
                    "snippet": {"title": "A channel", "channelTitle": "A channel"}
                }
            ]
        }))
        .unwrap();

        assert_eq!(
            format_videos(response),
            "Never Gonna Give You Up (Rick Astley): https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn empty_search_reports_no_videos() {
        let response: SearchResponse = serde_json::from_value(json!({"items": []})).unwrap();
        assert_eq!(format_videos(response), "No videos found");
    }
}
