//! Encyclopedia lookup using the Wikipedia search API and page summaries.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::error::{BotError, Result};

use super::utils::{fetch_json, require_text};
use super::{ToolHandler, ToolKind};

const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";
const SEARCH_PATH: &str = "/w/api.php";
const SUMMARY_PATH: &str = "/api/rest_v1/page/summary/";

#[derive(Debug, Deserialize)]
struct WikipediaArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: PageUrl,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: String,
}

/// Summary returned to the model
#[derive(Debug, Serialize)]
struct SummaryResult {
    title: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

pub struct Wikipedia {
    client: Client,
    base_url: String,
}

impl Wikipedia {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: WIKIPEDIA_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn best_title(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: SearchResponse = fetch_json(self.client.get(url).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", "1"),
            ("format", "json"),
        ]))
        .await?;

        Ok(response.query.search.into_iter().next().map(|hit| hit.title))
    }
}

/// Build the REST summary URL for a page title, path-encoding the title.
fn summary_url(base_url: &str, title: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{base_url}{SUMMARY_PATH}"))
        .map_err(|e| BotError::ToolExecution(format!("Invalid summary URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| BotError::ToolExecution("Summary URL cannot be a base".to_string()))?
        .pop_if_empty()
        .push(&title.replace(' ', "_"));
    Ok(url)
}

fn format_summary(summary: PageSummary) -> Result<String> {
    let result = SummaryResult {
        title: summary.title,
        summary: summary.extract,
        link: summary.content_urls.map(|urls| urls.desktop.page),
    };
    Ok(serde_json::to_string(&result)?)
}

#[async_trait]
impl ToolHandler for Wikipedia {
    fn kind(&self) -> ToolKind {
        ToolKind::Wikipedia
    }

    fn description(&self) -> &'static str {
        "Look up a topic on Wikipedia and return a short summary of the best matching article."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Topic or article title to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: WikipediaArgs = serde_json::from_str(arguments)?;
        let query = require_text(&args.query, "query")?;

        debug!("Searching Wikipedia for: {query}");

        let Some(title) = self.best_title(query).await? else {
            return Ok(format!("No Wikipedia article found for '{query}'"));
        };

        debug!("Fetching Wikipedia summary for: {title}");
        let summary: PageSummary = fetch_json(self.client.get(summary_url(&self.base_url, &title)?)).await?;

        format_summary(summary)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn execute_searches_then_fetches_the_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("action", "query"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "eiffel tower"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Eiffel Tower"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/summary/Eiffel_Tower"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Eiffel Tower",
                "extract": "A wrought-iron lattice tower in Paris."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = Wikipedia::new(Client::new())
            .with_base_url(server.uri())
            .execute(r#"{"query": "eiffel tower"}"#)
            .await
            .unwrap();

        let output: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            output,
            json!({"title": "Eiffel Tower", "summary": "A wrought-iron lattice tower in Paris."})
        );
    }

    #[tokio::test]
    async fn no_search_hit_skips_the_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"query": {"search": []}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(format!("^{SUMMARY_PATH}")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let output = Wikipedia::new(Client::new())
            .with_base_url(server.uri())
            .execute(r#"{"query": "qwxzzy"}"#)
            .await
            .unwrap();

        assert_eq!(output, "No Wikipedia article found for 'qwxzzy'");
    }

    #[test]
    fn summary_url_encodes_title() {
        let url = summary_url(WIKIPEDIA_BASE_URL, "Rust (programming language)").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Rust_(programming_language)"
        );

        let url = summary_url(WIKIPEDIA_BASE_URL, "AC/DC").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/AC%2FDC"
        );
    }

    #[test]
    fn summary_is_reshaped() {
        let summary: PageSummary = serde_json::from_value(json!({
            "title": "Paris",
            "extract": "Paris is the capital of France.",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Paris"}}
        }))
        .unwrap();

        let output: Value = serde_json::from_str(&format_summary(summary).unwrap()).unwrap();
        assert_eq!(
            output,
            json!({
                "title": "Paris",
                "summary": "Paris is the capital of France.",
                "link": "https://en.wikipedia.org/wiki/Paris"
            })
        );
    }

    #[test]
    fn empty_search_has_no_hits() {
        let response: SearchResponse =
            serde_json::from_value(json!({"batchcomplete": "", "query": {"search": []}})).unwrap();
        assert!(response.query.search.is_empty());
    }
}
