//! Centralized prompt definitions for the generative-text oracle
//!
//! This module contains all prompts sent to the oracle. Centralizing them
//! makes them easier to maintain, test, and version.

/// Build the prompt for drafting a flat list of candidate claims.
pub fn draft_claims_prompt(topic: &str) -> String {
    format!("Give 3 concise one-sentence claims about: {}", topic)
}

/// Build the prompt for drafting a structured stanza.
///
/// The oracle is instructed to answer in a fixed labeled-line format so the
/// adapter can parse it without a JSON contract.
pub fn draft_stanza_prompt(topic: &str) -> String {
    format!(
        r#"Produce a structured argument about: {}

Answer using EXACTLY these labeled lines, one per line, nothing else:

CLAIM: <one concise central claim>
SUPPORT 1: <first supporting point>
SUPPORT 2: <second supporting point>
COUNTER: <the strongest counterargument>
QUESTION: <an open question the claim raises>"#,
        topic
    )
}

/// Build the single-word stance classification prompt.
///
/// The vocabulary is constrained so the classifier can validate the answer
/// against the stance set and fall back when the oracle strays off it.
pub fn classify_stance_prompt(reply: &str, parent_claim: &str) -> String {
    format!(
        r#"Classify this response to the claim "{}":

Response: "{}"

Classify as exactly one of: support, challenge, question

Only respond with the single word classification."#,
        parent_claim, reply
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_claims_prompt_includes_topic() {
        let prompt = draft_claims_prompt("urban cycling");
        assert!(prompt.contains("urban cycling"));
        assert!(prompt.contains("3 concise"));
    }

    #[test]
    fn test_stanza_prompt_lists_all_labels() {
        let prompt = draft_stanza_prompt("remote work");
        for label in ["CLAIM:", "SUPPORT 1:", "SUPPORT 2:", "COUNTER:", "QUESTION:"] {
            assert!(prompt.contains(label), "missing label {}", label);
        }
    }

    #[test]
    fn test_classify_prompt_embeds_both_texts() {
        let prompt = classify_stance_prompt("dogs are loyal", "cats are better");
        assert!(prompt.contains("dogs are loyal"));
        assert!(prompt.contains("cats are better"));
        assert!(prompt.contains("support, challenge, question"));
    }
}
