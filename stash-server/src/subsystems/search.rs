//! Natural-language search subsystem
//!
//! Answers a free-text query over the caller's full saved-link corpus. The
//! corpus is rendered into a compact line-per-link context and handed to the
//! gateway with a forced `search_results` tool call, so the answer and the
//! matched ids come back as machine-parseable arguments. Matching happens in
//! the model — there is no local index and no caching; every query re-reads
//! the corpus and issues exactly one gateway call.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use stash_core::gateway::{ChatMessage, GatewayError, TextGenerator, ToolFunction};
use stash_core::models::SavedLink;
use stash_core::StashError;

use crate::store;

pub const EMPTY_CORPUS_ANSWER: &str = "You haven't saved any links yet. Start by saving some links and I'll be able to help you find them!";

pub const NO_MATCH_ANSWER: &str = "I couldn't find anything matching your query.";

/// Search result matching the HTTP contract. `matchedIds` is a highlight
/// membership set for the UI, not a ranking — order is whatever the model
/// returned.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub answer: String,
    pub matched_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    matched_ids: Vec<String>,
}

/// One context line per link, most-recent-first order preserved from the
/// store read.
pub fn render_corpus(links: &[SavedLink]) -> String {
    links
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let tags = l
                .tags
                .iter()
                .chain(l.ai_tags.iter())
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            let blurb = l
                .summary
                .as_deref()
                .or(l.og_description.as_deref())
                .or(l.notes.as_deref())
                .unwrap_or("");
            format!(
                "[{}] ID:{} | \"{}\" | {} | Tags: {} | {} | {} | Saved: {}",
                i + 1,
                l.id,
                l.title,
                l.platform.as_str(),
                tags,
                blurb,
                l.url,
                l.created_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn search_tool() -> ToolFunction {
    ToolFunction {
        name: "search_results".to_string(),
        description: "Return search results with answer and matched link IDs".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "Natural language answer to the user's query"
                },
                "matched_ids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "IDs of matching saved links"
                }
            },
            "required": ["answer", "matched_ids"],
            "additionalProperties": false
        }),
    }
}

fn system_prompt(context: &str) -> String {
    format!(
        "You are a helpful search assistant for a link-saving app called Linkstash. \
         The user has saved links listed below. Answer their question naturally, \
         referencing specific saved links when relevant. If they're looking for \
         something, identify the matching links by their IDs.\n\n\
         User's saved links:\n{context}"
    )
}

/// Search over an already-loaded corpus. Split from the store read so the
/// short-circuit and call-count behavior are testable without a database.
pub async fn run_search(
    links: &[SavedLink],
    query: &str,
    generator: &dyn TextGenerator,
) -> Result<SearchResponse, StashError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(StashError::InvalidInput("Query is required".to_string()));
    }

    // Empty corpus: canned answer, no gateway call.
    if links.is_empty() {
        return Ok(SearchResponse {
            answer: EMPTY_CORPUS_ANSWER.to_string(),
            matched_ids: Vec::new(),
        });
    }

    let context = render_corpus(links);
    let messages = vec![
        ChatMessage::system(system_prompt(&context)),
        ChatMessage::user(query),
    ];

    let args = match generator.call_tool(messages, search_tool()).await {
        Ok(v) => v,
        // A 2xx response without the mandated invocation is "nothing found",
        // not a failure; everything else is surfaced distinctly.
        Err(GatewayError::MissingToolCall) => {
            return Ok(SearchResponse {
                answer: NO_MATCH_ANSWER.to_string(),
                matched_ids: Vec::new(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let parsed: SearchArgs = serde_json::from_value(args).map_err(GatewayError::ToolArguments)?;

    let answer = if parsed.answer.is_empty() {
        NO_MATCH_ANSWER.to_string()
    } else {
        parsed.answer
    };

    tracing::info!(matches = parsed.matched_ids.len(), "AI search result");

    Ok(SearchResponse {
        answer,
        matched_ids: parsed.matched_ids,
    })
}

/// Full-corpus search for one owner: load everything, then delegate.
pub async fn search_links(
    pool: &PgPool,
    generator: &dyn TextGenerator,
    user_id: Uuid,
    query: &str,
) -> Result<SearchResponse, StashError> {
    let links = store::links::list_links(pool, user_id).await?;
    run_search(&links, query, generator).await
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use stash_core::platform::Platform;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting stand-in for the gateway: returns a scripted outcome and
    /// records how many calls it saw.
    struct ScriptedGenerator {
        calls: AtomicUsize,
        outcome: fn() -> Result<serde_json::Value, GatewayError>,
    }

    impl ScriptedGenerator {
        fn new(outcome: fn() -> Result<serde_json::Value, GatewayError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn call_tool(
            &self,
            _messages: Vec<ChatMessage>,
            _tool: ToolFunction,
        ) -> Result<serde_json::Value, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn link(title: &str, summary: Option<&str>) -> SavedLink {
        let now = Utc::now();
        SavedLink {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            url: format!("https://example.com/{title}"),
            title: title.to_string(),
            platform: Platform::Article,
            thumbnail: None,
            notes: None,
            tags: vec!["saved".to_string()],
            ai_tags: vec!["auto".to_string()],
            og_image: None,
            og_description: None,
            favicon: None,
            summary: summary.map(str::to_string),
            collection_id: None,
            is_highlighted: false,
            reminder_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid_input() {
        let generator = ScriptedGenerator::new(|| Ok(serde_json::json!({})));
        let result = run_search(&[], "   ", &generator).await;
        assert!(matches!(result, Err(StashError::InvalidInput(_))));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_short_circuits_without_gateway_call() {
        let generator = ScriptedGenerator::new(|| Ok(serde_json::json!({})));
        let response = run_search(&[], "pasta recipes", &generator).await.unwrap();

        assert_eq!(response.answer, EMPTY_CORPUS_ANSWER);
        assert!(response.matched_ids.is_empty());
        assert_eq!(generator.calls(), 0, "Empty corpus must not call the gateway");
    }

    #[tokio::test]
    async fn test_non_empty_corpus_issues_exactly_one_call() {
        let generator = ScriptedGenerator::new(|| {
            Ok(serde_json::json!({
                "answer": "Your pasta recipe is saved.",
                "matched_ids": ["abc"]
            }))
        });
        let links = vec![link("Pasta", Some("A recipe")), link("Shoes", None)];

        let response = run_search(&links, "pasta", &generator).await.unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(response.answer, "Your pasta recipe is saved.");
        assert_eq!(response.matched_ids, vec!["abc"]);
    }

    #[tokio::test]
    async fn test_missing_tool_call_yields_default_answer() {
        let generator = ScriptedGenerator::new(|| Err(GatewayError::MissingToolCall));
        let links = vec![link("Pasta", None)];

        let response = run_search(&links, "pasta", &generator).await.unwrap();

        assert_eq!(response.answer, NO_MATCH_ANSWER);
        assert!(response.matched_ids.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_propagates_distinctly() {
        let generator = ScriptedGenerator::new(|| Err(GatewayError::RateLimited));
        let links = vec![link("Pasta", None)];

        let result = run_search(&links, "pasta", &generator).await;
        assert!(matches!(
            result,
            Err(StashError::Gateway(GatewayError::RateLimited))
        ));
    }

    #[tokio::test]
    async fn test_quota_exhaustion_propagates_distinctly() {
        let generator = ScriptedGenerator::new(|| Err(GatewayError::QuotaExhausted));
        let links = vec![link("Pasta", None)];

        let result = run_search(&links, "pasta", &generator).await;
        assert!(matches!(
            result,
            Err(StashError::Gateway(GatewayError::QuotaExhausted))
        ));
    }

    #[test]
    fn test_render_corpus_line_shape() {
        let links = vec![link("Pasta", Some("A recipe"))];
        let context = render_corpus(&links);

        assert!(context.starts_with(&format!("[1] ID:{}", links[0].id)));
        assert!(context.contains("\"Pasta\""));
        assert!(context.contains("article"));
        assert!(context.contains("Tags: saved, auto"));
        assert!(context.contains("A recipe"));
        assert!(context.contains(&links[0].url));
    }

    #[test]
    fn test_render_corpus_blurb_falls_back_to_notes() {
        let mut l = link("Pasta", None);
        l.notes = Some("my note".to_string());
        let context = render_corpus(&[l]);
        assert!(context.contains("my note"));
    }
}
