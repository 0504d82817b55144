/// Strip a markdown code fence wrapping a response body.
///
/// Models often wrap JSON in ```` ```json … ``` ```` despite being asked for
/// a bare body. Handles any language tag after the opening fence and a
/// trailing fence with or without a final newline. Text without fences is
/// returned trimmed and otherwise untouched.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strips_bare_fence() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_unfenced_passes_through() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_without_trailing_newline() {
        assert_eq!(strip_code_fences("```json\n[1, 2]```"), "[1, 2]");
    }

    #[test]
    fn test_braces_inside_body_survive() {
        let body = "{\"code\": \"``\"}";
        assert_eq!(strip_code_fences(&format!("```json\n{body}\n```")), body);
    }
}
