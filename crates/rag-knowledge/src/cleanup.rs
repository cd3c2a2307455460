//! Generated-answer cleanup (§4.3.3): trims LLM boilerplate so the stored
//! answer reads as a direct response rather than a continuation of a prompt.

use rag_core::sanitize::normalize_newlines;

const KNOWN_PREAMBLES: &[&str] = &[
    "Based on the provided context, ",
    "Based on the context provided, ",
    "According to the document, ",
    "According to the provided documents, ",
    "Based on the information provided, ",
];

fn collapse_excess_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut consecutive_newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            consecutive_newlines += 1;
            if consecutive_newlines <= 2 {
                out.push(ch);
            }
        } else {
            consecutive_newlines = 0;
            out.push(ch);
        }
    }
    out
}

fn strip_known_preamble(text: &str) -> String {
    for preamble in KNOWN_PREAMBLES {
        if let Some(rest) = text.strip_prefix(preamble) {
            return recapitalize(rest);
        }
    }
    text.to_string()
}

fn recapitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Cleans a raw generated answer: trim, normalize newlines, collapse runs of
/// 3+ blank lines to 2, strip a known preamble and re-capitalize.
pub fn clean_generated_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    let normalized = normalize_newlines(trimmed);
    let collapsed = collapse_excess_blank_lines(&normalized);
    strip_known_preamble(collapsed.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_preamble_and_recapitalizes() {
        let out = clean_generated_answer("Based on the provided context, the answer is 42.");
        assert_eq!(out, "The answer is 42.");
    }

    #[test]
    fn normalizes_crlf() {
        let out = clean_generated_answer("line one\r\nline two");
        assert_eq!(out, "line one\nline two");
    }

    #[test]
    fn collapses_three_or_more_newlines_to_two() {
        let out = clean_generated_answer("para one\n\n\n\npara two");
        assert_eq!(out, "para one\n\npara two");
    }

    #[test]
    fn leaves_unrecognized_text_untouched_besides_trim() {
        let out = clean_generated_answer("  plain answer  ");
        assert_eq!(out, "plain answer");
    }
}
