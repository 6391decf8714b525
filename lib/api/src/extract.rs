//! Pulling the schema text out of a chat-completions response
//!
//! Providers disagree on where the assistant text lives. The shapes tried, in order:
//!
//! - `choices[0].message.content`
//! - `completion_message.content` (a string, or an object with `text`)
//! - top-level `content`

use serde_json::Value;

pub fn extract_content(response: &Value) -> Option<String> {
    let candidates = [
        response.pointer("/choices/0/message/content"),
        response
            .pointer("/completion_message/content/text")
            .or_else(|| response.pointer("/completion_message/content")),
        response.get("content"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Strip a surrounding Markdown code fence such as ```` ```json ... ``` ````
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
