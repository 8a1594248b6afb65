//! Movie and TV lookup using The Movie Database (TMDB) search API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

use super::utils::{fetch_json, require_text};
use super::{ToolHandler, ToolKind};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org";
const TMDB_SEARCH_PATH: &str = "/3/search/multi";
const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct MovieSearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    media_type: String,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    overview: String,
    vote_average: Option<f64>,
}

/// A movie or show returned to the model
#[derive(Debug, Serialize)]
struct MediaResult {
    kind: &'static str,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    released: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    overview: String,
}

pub struct MovieSearch {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl MovieSearch {
    pub fn new(client: Client, bearer_token: String) -> Self {
        Self {
            client,
            base_url: TMDB_BASE_URL.to_string(),
            bearer_token,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn format_results(response: SearchResponse) -> Result<String> {
    let results: Vec<MediaResult> = response
        .results
        .into_iter()
        .filter_map(|item| {
            let (kind, title, released) = match item.media_type.as_str() {
                "movie" => ("movie", item.title?, item.release_date),
                "tv" => ("tv", item.name?, item.first_air_date),
                _ => return None,
            };
            Some(MediaResult {
                kind,
                title,
                released: released.filter(|date| !date.is_empty()),
                rating: item.vote_average,
                overview: item.overview,
            })
        })
        .take(MAX_RESULTS)
        .collect();

    if results.is_empty() {
        return Ok("No movies or shows found".to_string());
    }

    Ok(serde_json::to_string_pretty(&results)?)
}

#[async_trait]
impl ToolHandler for MovieSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::MovieSearch
    }

    fn description(&self) -> &'static str {
        "Look up movies and TV shows: release dates, ratings and plot overviews."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Title of the movie or show"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: MovieSearchArgs = serde_json::from_str(arguments)?;
        let query = require_text(&args.query, "query")?;

        debug!("Searching TMDB for: {query}");

        let response: SearchResponse = fetch_json(
            self.client
                .get(format!("{}{TMDB_SEARCH_PATH}", self.base_url))
                .bearer_auth(&self.bearer_token)
                .query(&[("query", query), ("include_adult", "false")]),
        )
        .await?;

        format_results(response)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::BotError;

    #[tokio::test]
    async fn execute_authenticates_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TMDB_SEARCH_PATH))
            .and(header("authorization", "Bearer tmdb-token"))
            .and(query_param("query", "Dune"))
            .and(query_param("include_adult", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"media_type": "movie", "title": "Dune", "overview": "Spice."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = MovieSearch::new(Client::new(), "tmdb-token".to_string())
            .with_base_url(server.uri())
            .execute(r#"{"query": "Dune"}"#)
            .await
            .unwrap();

        let output: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output, json!([{"kind": "movie", "title": "Dune", "overview": "Spice."}]));
    }

    #[tokio::test]
    async fn rejected_token_is_a_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"status_message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let err = MovieSearch::new(Client::new(), "wrong".to_string())
            .with_base_url(server.uri())
            .execute(r#"{"query": "Dune"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::ToolExecution(msg) if msg.contains("401")));
    }

    #[test]
    fn movies_and_shows_are_kept_people_dropped() {
        let response: SearchResponse = serde_json::from_value(json!({
            "page": 1,
            "results": [
                {
                    "media_type": "movie",
                    "title": "Dune",
                    "release_date": "2021-09-15",
                    "overview": "Paul Atreides...",
                    "vote_average": 7.8
                },
                {"media_type": "person", "name": "Frank Herbert"},
                {
                    "media_type": "tv",
                    "name": "Dune: Prophecy",
                    "first_air_date": "",
                    "overview": "Ten thousand years..."
                }
            ]
        }))
        .unwrap();

        let output: Value = serde_json::from_str(&format_results(response).unwrap()).unwrap();
        assert_eq!(
            output,
            json!([
                {
                    "kind": "movie",
                    "title": "Dune",
                    "released": "2021-09-15",
                    "rating": 7.8,
                    "overview": "Paul Atreides..."
                },
                {
                    "kind": "tv",
                    "title": "Dune: Prophecy",
                    "overview": "Ten thousand years..."
                }
            ])
        );
    }

    #[test]
    fn nothing_found() {
        let response: SearchResponse = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(format_results(response).unwrap(), "No movies or shows found");
    }
}
