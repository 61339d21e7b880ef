//! Logging setup and prompt size estimation

pub mod count_tokens;
pub mod logging;

pub use count_tokens::{count_text_tokens, estimate_prompt_tokens};
pub use logging::{init_logging, parse_level};
