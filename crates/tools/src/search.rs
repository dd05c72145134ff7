//! Web search tool backed by the DuckDuckGo instant answer API.
//!
//! The observation handed back to the model is plain text: the direct
//! answer or abstract when DuckDuckGo has one, followed by related topic
//! snippets. A query with no hits is a normal observation, not a failure.

use async_trait::async_trait;
use jarvis_config::SearchConfig;
use jarvis_core::error::ToolError;
use jarvis_core::tool::Tool;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const NAME: &str = "Search";

pub struct SearchTool {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_results: usize,
}

impl SearchTool {
    pub fn new(config: &SearchConfig) -> Result<Self, ToolError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::Execution {
                tool_name: NAME.into(),
                cause: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
            max_results: config.max_results.max(1),
        })
    }

    fn request_error(&self, err: reqwest::Error) -> ToolError {
        if err.is_timeout() {
            ToolError::Timeout {
                tool_name: NAME.into(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ToolError::Execution {
                tool_name: NAME.into(),
                cause: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Useful for searching the internet for current information. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("search query is empty".into()));
        }

        debug!(query, "Searching");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Execution {
                tool_name: NAME.into(),
                cause: format!("search endpoint returned status {}", status.as_u16()),
            });
        }

        let body: InstantAnswer = response.json().await.map_err(|e| ToolError::Execution {
            tool_name: NAME.into(),
            cause: format!("unreadable search response: {e}"),
        })?;

        Ok(summarize(query, &body, self.max_results))
    }
}

/// The subset of the instant answer payload we read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a single topic or a named group of topics.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

fn collect_topics<'a>(topics: &'a [RelatedTopic], out: &mut Vec<&'a str>) {
    for topic in topics {
        match topic {
            RelatedTopic::Topic { text } if !text.trim().is_empty() => out.push(text.trim()),
            RelatedTopic::Topic { .. } => {}
            RelatedTopic::Group { topics } => collect_topics(topics, out),
        }
    }
}

fn summarize(query: &str, body: &InstantAnswer, max_results: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !body.answer.trim().is_empty() {
        lines.push(body.answer.trim().to_string());
    }
    if !body.abstract_text.trim().is_empty() {
        if body.abstract_source.is_empty() {
            lines.push(body.abstract_text.trim().to_string());
        } else {
            lines.push(format!("{} (source: {})", body.abstract_text.trim(), body.abstract_source));
        }
    }
    if !body.definition.trim().is_empty() {
        lines.push(body.definition.trim().to_string());
    }

    let mut topics = Vec::new();
    collect_topics(&body.related_topics, &mut topics);
    for text in topics {
        if lines.len() >= max_results {
            break;
        }
        lines.push(format!("- {text}"));
    }

    lines.truncate(max_results);

    if lines.is_empty() {
        format!("No results found for '{query}'.")
    } else {
        lines.join("\n")
    }
}
