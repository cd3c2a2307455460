//! Retrieve-only answer composition (§4.3.2): a deterministic fallback used
//! when the generate call fails. Not meant to compete with the LLM, only to
//! degrade gracefully.

use rag_core::models::Source;

const TECHNICAL_KEYWORDS: &[&str] = &[
    "cors",
    "api",
    "development",
    "server",
    "deploy",
    "deployment",
    "docker",
    "kubernetes",
    "config",
    "configuration",
    "database",
    "infrastructure",
];

fn is_technical_question(question: &str) -> bool {
    let lower = question.to_lowercase();
    TECHNICAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn highest_confidence(sources: &[Source]) -> Option<&Source> {
    sources
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal))
}

/// Composes an answer from retrieval alone, per §4.3.2.
pub fn compose_retrieve_only_answer(question: &str, sources: &[Source]) -> String {
    let best = match highest_confidence(sources) {
        Some(s) => s,
        None => {
            return format!(
                "I was unable to extract a relevant answer to \"{question}\" from the available documents."
            )
        }
    };

    if best.excerpt.trim().is_empty() {
        return format!(
            "I was unable to extract a relevant answer to \"{question}\" from the available documents."
        );
    }

    if is_technical_question(question) {
        format!(
            "Based on the available technical documentation, here is relevant information: {}",
            best.excerpt
        )
    } else {
        format!("Here is what I found relevant to your question: {}", best.excerpt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(excerpt: &str, confidence: f64) -> Source {
        Source {
            document_id: "doc-1".to_string(),
            file_name: "a.md".to_string(),
            excerpt: excerpt.to_string(),
            confidence,
        }
    }

    #[test]
    fn empty_sources_yields_unable_to_extract_message() {
        let answer = compose_retrieve_only_answer("what is this?", &[]);
        assert!(answer.contains("what is this?"));
        assert!(answer.to_lowercase().contains("unable"));
    }

    #[test]
    fn empty_best_excerpt_yields_unable_to_extract_message() {
        let answer = compose_retrieve_only_answer("hello", &[source("", 0.9)]);
        assert!(answer.contains("hello"));
    }

    #[test]
    fn technical_question_uses_technical_template() {
        let sources = vec![source("passage one", 0.5), source("passage two", 0.9)];
        let answer = compose_retrieve_only_answer("how do I configure CORS?", &sources);
        assert!(answer.contains("technical"));
        assert!(answer.contains("passage two"));
    }

    #[test]
    fn general_question_uses_general_template() {
        let answer = compose_retrieve_only_answer("what is the weather", &[source("passage", 0.9)]);
        assert!(!answer.contains("technical"));
        assert!(answer.contains("passage"));
    }

    #[test]
    fn picks_highest_confidence_source() {
        let sources = vec![source("low", 0.2), source("high", 0.9), source("mid", 0.5)];
        let answer = compose_retrieve_only_answer("general question", &sources);
        assert!(answer.contains("high"));
    }
}
