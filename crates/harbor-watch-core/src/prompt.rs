//! Fixed prompt text and composite prompt construction.

/// Appended to every user turn sent through the direct inference backend.
pub const WORD_LIMIT_INSTRUCTION: &str = " (Please answer concisely in under 80 words.)";

/// Shown when the backend answered but the response carried no reply.
pub const NO_REPLY_FALLBACK: &str = "Sorry, I couldn't get a response.";

/// Shown when the exchange failed outright.
pub const ERROR_REPLY: &str = "Oops! Something went wrong. Please try again.";

pub const DEFAULT_GREETING: &str =
    "Hello! I'm your Harbor Watch AI. How can I assist you with coastal data today?";

const PREAMBLE: &str = "You are Harbor Watch AI, an assistant embedded in a coastal-monitoring \
dashboard. Help the operator understand tides, water quality, weather, and harbor activity. \
Answer concisely in under 80 words and ground your answer in the monitoring context when it \
is relevant.";

pub fn with_word_limit(input: &str) -> String {
    format!("{}{}", input, WORD_LIMIT_INSTRUCTION)
}

/// Build the single-field prompt used by backends that take one text blob
/// instead of a message list.
pub fn composite_prompt(context: Option<&str>, question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("Current monitoring context:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }

    prompt.push_str("User question: ");
    prompt.push_str(question);

    prompt
}

/// Fixed system message used to hand monitoring context to chat-style backends.
pub fn context_system_message(context: &str) -> String {
    format!(
        "You are Harbor Watch AI. Current monitoring context from the dashboard:\n{}",
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_limit_is_appended_verbatim() {
        assert_eq!(
            with_word_limit("status?"),
            "status? (Please answer concisely in under 80 words.)"
        );
    }

    #[test]
    fn composite_contains_context_and_question() {
        let prompt = composite_prompt(Some("Storm surge warning active"), "what's happening?");
        assert!(prompt.starts_with("You are Harbor Watch AI"));
        assert!(prompt.contains("Current monitoring context:\nStorm surge warning active"));
        assert!(prompt.ends_with("User question: what's happening?"));
    }

    #[test]
    fn composite_without_context_skips_section() {
        let prompt = composite_prompt(None, "tide times?");
        assert!(!prompt.contains("monitoring context:"));
        assert!(prompt.ends_with("User question: tide times?"));

        let blank = composite_prompt(Some("   "), "tide times?");
        assert_eq!(blank, prompt);
    }
}
