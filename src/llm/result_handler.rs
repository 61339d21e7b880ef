//! Size limiting for tool results before they are sent back to the model

/// Configuration for result handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHandlerConfig {
    /// Maximum size in bytes for tool results
    pub max_size_bytes: usize,
    /// Whether to truncate large results (true) or replace with warning (false)
    pub truncate_enabled: bool,
}

impl Default for ResultHandlerConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 256_000,
            truncate_enabled: true,
        }
    }
}

/// Largest prefix of `text` that fits in `max_bytes` without splitting a char
fn prefix_within(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Handle large tool results by truncating or warning
///
/// Results within the limit are returned unchanged.
pub fn handle_large_result(tool_name: &str, content: &str, config: &ResultHandlerConfig) -> String {
    let size = content.len();
    if size <= config.max_size_bytes {
        return content.to_string();
    }

    if config.truncate_enabled {
        format!(
            "{}\n\n[truncated: result from '{}' was {} bytes, limit is {} bytes]",
            prefix_within(content, config.max_size_bytes),
            tool_name,
            size,
            config.max_size_bytes
        )
    } else {
        format!(
            "Result from '{}' omitted: {} bytes exceeds the {} byte limit. \
            Call the tool again with narrower arguments.",
            tool_name, size, config.max_size_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_large_result_small() {
        let config = ResultHandlerConfig::default();
        let small_result = "sunny with a high of 75°F.";
        assert_eq!(handle_large_result("getCurrentWeather", small_result, &config), small_result);
    }

    #[test]
    fn test_handle_large_result_large_with_truncation() {
        let config = ResultHandlerConfig {
            max_size_bytes: 1000,
            truncate_enabled: true,
        };

        let large_result = "x".repeat(1500);
        let processed = handle_large_result("searchWeb", &large_result, &config);

        assert!(processed.starts_with(&"x".repeat(1000)));
        assert!(!processed.starts_with(&"x".repeat(1001)));
        assert!(processed.contains("[truncated: result from 'searchWeb' was 1500 bytes"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let config = ResultHandlerConfig {
            max_size_bytes: 4,
            truncate_enabled: true,
        };

        // '°' spans bytes 3..5; a cut at byte 4 would land inside it
        let processed = handle_large_result("t", "75 °F and more", &config);
        assert!(processed.starts_with("75 \n"));
    }

    #[test]
    fn test_handle_large_result_large_without_truncation() {
        let config = ResultHandlerConfig {
            max_size_bytes: 1000,
            truncate_enabled: false,
        };

        let large_result = "x".repeat(1500);
        let processed = handle_large_result("searchWeb", &large_result, &config);

        assert!(processed.starts_with("Result from 'searchWeb' omitted"));
        assert!(!processed.contains("xxx"));
    }
}
