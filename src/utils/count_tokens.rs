//! Prompt size estimation
//!
//! Uses the cl100k_base tokenizer when the `tiktoken` feature is enabled and
//! falls back to a whitespace word count otherwise. The numbers are only
//! logged; the endpoint's own `usage` block is authoritative.

use crate::llm::ChatMessage;

/// Per-message framing overhead in the chat format (role markers etc.)
const TOKENS_PER_MESSAGE: usize = 4;

/// Count tokens in `text` using cl100k_base if enabled, otherwise whitespace words
#[cfg(feature = "tiktoken")]
pub fn count_text_tokens(text: &str) -> usize {
    match tiktoken_rs::cl100k_base() {
        Ok(bpe) => bpe.encode_with_special_tokens(text).len(),
        Err(_) => text.split_whitespace().count(),
    }
}

#[cfg(not(feature = "tiktoken"))]
pub fn count_text_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated prompt tokens for a message sequence, tool-call payloads included
pub fn estimate_prompt_tokens(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|message| {
            let calls: usize = message
                .requested_tool_calls()
                .iter()
                .map(|call| count_text_tokens(call.name()) + count_text_tokens(call.arguments()))
                .sum();
            TOKENS_PER_MESSAGE + count_text_tokens(&message.content) + calls
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolCall;

    #[test]
    fn test_count_text_tokens() {
        assert_eq!(count_text_tokens(""), 0);
        assert!(count_text_tokens("hello world") >= 2);
    }

    #[test]
    fn test_estimate_grows_with_messages() {
        let one = vec![ChatMessage::user("What's the weather like in Boston today?")];
        let mut two = one.clone();
        two.push(ChatMessage::assistant_with_tools(
            "",
            vec![ToolCall::new(
                "call_1",
                "getCurrentWeather",
                r#"{"location": "Boston", "unit": "fahrenheit"}"#,
            )],
        ));

        let small = estimate_prompt_tokens(&one);
        let large = estimate_prompt_tokens(&two);
        assert!(small > TOKENS_PER_MESSAGE);
        assert!(large > small + TOKENS_PER_MESSAGE);
        assert_eq!(estimate_prompt_tokens(&[]), 0);
    }
}
