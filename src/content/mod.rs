//! Generated argumentative content: the claim drafter and the stance
//! classifier. Both are polymorphic over the [`TextOracle`] capability so
//! tests can script the oracle.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::OracleResult;
use crate::graph::Stance;
use crate::oracle::TextOracle;
use crate::prompts;

/// Placeholder inserted for any stanza label the oracle failed to emit.
pub const MISSING_FIELD: &str = "(not generated)";

/// A structured argument: one claim, its supports, the strongest
/// counterargument, and an open question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    pub claim: String,
    pub supports: Vec<String>,
    pub counter: String,
    pub question: String,
}

impl Stanza {
    /// Parse the oracle's labeled-line output.
    ///
    /// Each label degrades independently to [`MISSING_FIELD`] when absent;
    /// a malformed completion never fails the whole parse.
    pub fn parse(text: &str) -> Self {
        let mut claim = None;
        let mut supports = Vec::new();
        let mut counter = None;
        let mut question = None;

        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = strip_label(line, "CLAIM:") {
                claim.get_or_insert_with(|| rest.to_string());
            } else if let Some(rest) = strip_support_label(line) {
                supports.push(rest.to_string());
            } else if let Some(rest) = strip_label(line, "COUNTER:") {
                counter.get_or_insert_with(|| rest.to_string());
            } else if let Some(rest) = strip_label(line, "QUESTION:") {
                question.get_or_insert_with(|| rest.to_string());
            }
        }

        if supports.is_empty() {
            supports.push(MISSING_FIELD.to_string());
        }

        Self {
            claim: claim.unwrap_or_else(|| MISSING_FIELD.to_string()),
            supports,
            counter: counter.unwrap_or_else(|| MISSING_FIELD.to_string()),
            question: question.unwrap_or_else(|| MISSING_FIELD.to_string()),
        }
    }

    /// Render the stanza as a single content string for the root node.
    pub fn render(&self) -> String {
        let mut out = self.claim.clone();
        for support in &self.supports {
            out.push_str("\n• ");
            out.push_str(support);
        }
        out.push_str("\nCounter: ");
        out.push_str(&self.counter);
        out.push_str("\nQuestion: ");
        out.push_str(&self.question);
        out
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label).map(str::trim)
}

/// Match `SUPPORT:` or `SUPPORT <n>:` lines.
fn strip_support_label(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("SUPPORT")?;
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == ' ');
    rest.strip_prefix(':').map(str::trim)
}

/// Strip a leading "1." / "2)" style enumeration prefix from a drafted
/// claim line.
fn strip_number_prefix(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    rest.trim_start_matches(['.', ')']).trim_start()
}

/// Generative content adapter: turns a topic into candidate claims or a
/// structured stanza.
#[derive(Clone)]
pub struct ClaimDrafter {
    oracle: Arc<dyn TextOracle>,
}

impl ClaimDrafter {
    /// Create a drafter backed by the given oracle
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Draft up to three concise one-sentence claims about a topic.
    ///
    /// Blank lines and bare enumeration markers are dropped; leading
    /// numbering is stripped. An empty result is possible and left to the
    /// caller to report.
    pub async fn draft_claims(&self, topic: &str) -> OracleResult<Vec<String>> {
        let completion = self
            .oracle
            .generate(&prompts::draft_claims_prompt(topic))
            .await?;

        let claims: Vec<String> = completion
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(strip_number_prefix)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .take(3)
            .collect();

        debug!(topic = %topic, count = claims.len(), "Drafted claims");
        Ok(claims)
    }

    /// Draft a structured stanza about a topic.
    pub async fn draft_stanza(&self, topic: &str) -> OracleResult<Stanza> {
        let completion = self
            .oracle
            .generate(&prompts::draft_stanza_prompt(topic))
            .await?;
        Ok(Stanza::parse(&completion))
    }
}

/// Stance classifier: labels a reply against its parent claim.
#[derive(Clone)]
pub struct StanceClassifier {
    oracle: Arc<dyn TextOracle>,
}

impl StanceClassifier {
    /// Create a classifier backed by the given oracle
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Classify a reply's stance toward its parent claim.
    ///
    /// Fails open: an oracle failure or an answer outside
    /// {support, challenge, question} yields [`Stance::Question`] so one
    /// bad classification never blocks graph growth.
    pub async fn classify(&self, reply: &str, parent_claim: &str) -> Stance {
        let prompt = prompts::classify_stance_prompt(reply, parent_claim);

        match self.oracle.generate(&prompt).await {
            Ok(answer) => match Stance::from_label(&answer) {
                Some(stance @ (Stance::Support | Stance::Challenge | Stance::Question)) => stance,
                _ => {
                    warn!(answer = %answer.trim(), "Off-vocabulary classification, defaulting to question");
                    Stance::Question
                }
            },
            Err(e) => {
                warn!(error = %e, "Classification failed, defaulting to question");
                Stance::Question
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MockTextOracle;

    fn scripted_oracle(answer: &str) -> Arc<MockTextOracle> {
        let mut oracle = MockTextOracle::new();
        let answer = answer.to_string();
        oracle
            .expect_generate()
            .returning(move |_| Ok(answer.clone()));
        Arc::new(oracle)
    }

    #[test]
    fn test_stanza_parse_complete() {
        let stanza = Stanza::parse(
            "CLAIM: Cities should charge for road use\n\
             SUPPORT 1: Congestion pricing cuts traffic\n\
             SUPPORT 2: Revenue funds transit\n\
             COUNTER: It burdens low-income drivers\n\
             QUESTION: What exemptions are fair?",
        );
        assert_eq!(stanza.claim, "Cities should charge for road use");
        assert_eq!(stanza.supports.len(), 2);
        assert_eq!(stanza.counter, "It burdens low-income drivers");
        assert_eq!(stanza.question, "What exemptions are fair?");
    }

    #[test]
    fn test_stanza_parse_degrades_per_label() {
        let stanza = Stanza::parse("CLAIM: Only a claim came back");
        assert_eq!(stanza.claim, "Only a claim came back");
        assert_eq!(stanza.supports, vec![MISSING_FIELD.to_string()]);
        assert_eq!(stanza.counter, MISSING_FIELD);
        assert_eq!(stanza.question, MISSING_FIELD);
    }

    #[test]
    fn test_stanza_parse_garbage() {
        let stanza = Stanza::parse("no labels at all\njust prose");
        assert_eq!(stanza.claim, MISSING_FIELD);
        assert_eq!(stanza.counter, MISSING_FIELD);
    }

    #[test]
    fn test_stanza_parse_unnumbered_support() {
        let stanza = Stanza::parse("SUPPORT: plain support line");
        assert_eq!(stanza.supports, vec!["plain support line".to_string()]);
    }

    #[test]
    fn test_strip_number_prefix() {
        assert_eq!(strip_number_prefix("1. Claim text"), "Claim text");
        assert_eq!(strip_number_prefix("2) Claim text"), "Claim text");
        assert_eq!(strip_number_prefix("Claim text"), "Claim text");
        assert_eq!(strip_number_prefix("3"), "");
    }

    #[tokio::test]
    async fn test_draft_claims_strips_numbering() {
        let oracle = scripted_oracle("1. First claim\n\n2. Second claim\n3.\n4. Fourth claim");
        let drafter = ClaimDrafter::new(oracle);

        let claims = drafter.draft_claims("anything").await.unwrap();
        assert_eq!(
            claims,
            vec![
                "First claim".to_string(),
                "Second claim".to_string(),
                "Fourth claim".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_classify_valid_label() {
        let classifier = StanceClassifier::new(scripted_oracle("  Challenge \n"));
        let stance = classifier.classify("dogs are loyal", "cats are better").await;
        assert_eq!(stance, Stance::Challenge);
    }

    #[tokio::test]
    async fn test_classify_off_vocabulary_defaults_to_question() {
        let classifier = StanceClassifier::new(scripted_oracle("strongly agree"));
        let stance = classifier.classify("reply", "claim").await;
        assert_eq!(stance, Stance::Question);
    }

    #[tokio::test]
    async fn test_classify_empty_answer_defaults_to_question() {
        let classifier = StanceClassifier::new(scripted_oracle(""));
        let stance = classifier.classify("reply", "claim").await;
        assert_eq!(stance, Stance::Question);
    }

    #[tokio::test]
    async fn test_classify_claim_label_is_off_vocabulary() {
        // "claim" is reserved for roots; the classifier must not emit it.
        let classifier = StanceClassifier::new(scripted_oracle("claim"));
        let stance = classifier.classify("reply", "claim").await;
        assert_eq!(stance, Stance::Question);
    }

    #[tokio::test]
    async fn test_classify_oracle_failure_defaults_to_question() {
        let mut oracle = MockTextOracle::new();
        oracle.expect_generate().returning(|_| {
            Err(crate::error::OracleError::Timeout { timeout_ms: 10 })
        });
        let classifier = StanceClassifier::new(Arc::new(oracle));

        let stance = classifier.classify("reply", "claim").await;
        assert_eq!(stance, Stance::Question);
    }
}
