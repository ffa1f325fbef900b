//! Pulling structured output out of free-form model replies

/// Extract the JSON payload from a model reply
///
/// Models often wrap JSON in a fenced code block (with or without a language
/// tag) or surround it with prose. The first fenced block wins; otherwise the
/// outermost `{ ... }` span is returned. If neither is present the trimmed
/// reply is returned unchanged and left for the JSON parser to reject.
pub fn extract_json_from_response(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(open) = trimmed.find("```") {
        let after_fence = &trimmed[open + 3..];
        let body = match after_fence.find('\n') {
            Some(newline) => &after_fence[newline + 1..],
            // Single-line fence: drop an inline language tag such as `json`
            None => after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
        let body = match body.find("```") {
            Some(close) => &body[..close],
            None => body,
        };
        return body.trim();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        return &trimmed[start..=end];
    }

    trimmed
}
