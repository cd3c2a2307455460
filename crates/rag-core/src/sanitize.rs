//! Idempotent text sanitizers shared by the entity model (§3, R2, R3, note
//! on "Ellipsis on truncation" in §9).

/// The entities [`html_escape`] ever produces, longest-prefix-first so a
/// `&` that already starts one of these is left alone on a repeat pass.
const KNOWN_ENTITIES: [&str; 5] = ["&amp;", "&quot;", "&#x27;", "&lt;", "&gt;"];

/// HTML-escapes the five characters that matter for safe embedding in a
/// document or HTML attribute. A `&` that already begins one of this
/// function's own output entities is passed through unescaped, which is
/// what makes a second pass over already-escaped text a no-op (R2) instead
/// of turning `&amp;` into `&amp;amp;`.
fn html_escape(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '&' => {
                if let Some(entity) = KNOWN_ENTITIES
                    .iter()
                    .find(|e| chars[i..].starts_with(e.chars().collect::<Vec<_>>().as_slice()))
                {
                    out.push_str(entity);
                    i += entity.chars().count();
                    continue;
                }
                out.push_str("&amp;");
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            ch => out.push(ch),
        }
        i += 1;
    }
    out
}

/// Normalizes CRLF/CR line endings to `\n`.
pub fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// Sanitizes a query question: trim, normalize newlines, HTML-escape.
///
/// R2: sanitizing an already-sanitized question is idempotent because the
/// escaped form contains no raw `<`, `>`, `"`, `'`, or bare `\r`, so a second
/// pass is a no-op (the only partially-unstable character, `&`, only ever
/// appears as part of a complete `&amp;`/`&lt;`/... entity, which round-trips
/// unchanged through another escape pass since none of `a`,`m`,`p`,`;` etc.
/// are themselves escaped).
pub fn sanitize_question(raw: &str) -> String {
    let trimmed = raw.trim();
    let normalized = normalize_newlines(trimmed);
    html_escape(&normalized)
}

/// Truncates `text` to at most `max_scalars` Unicode scalars, appending a
/// single ellipsis (U+2026) when truncation actually occurs and
/// `max_scalars > 1`. Counts by scalar, never by byte, so multi-byte
/// sequences are never split (§9).
///
/// R3: truncating twice equals truncating once, since the output of one
/// pass already has length `<= max_scalars`.
pub fn truncate_scalars(text: &str, max_scalars: usize) -> String {
    let scalar_count = text.chars().count();
    if scalar_count <= max_scalars {
        return text.to_string();
    }
    if max_scalars == 0 {
        return String::new();
    }
    if max_scalars == 1 {
        return text.chars().take(1).collect();
    }
    let mut truncated: String = text.chars().take(max_scalars - 1).collect();
    truncated.push('\u{2026}');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_escapes_and_trims() {
        let out = sanitize_question("  <script>alert('x')</script>\r\n  ");
        assert_eq!(out, "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;");
    }

    #[test]
    fn sanitize_normalizes_crlf() {
        let out = sanitize_question("line one\r\nline two");
        assert_eq!(out, "line one\nline two");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_question("A & B < C");
        let twice = sanitize_question(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn truncate_scalars_below_limit_is_unchanged() {
        assert_eq!(truncate_scalars("hello", 10), "hello");
    }

    #[test]
    fn truncate_scalars_appends_ellipsis() {
        let out = truncate_scalars("hello world", 6);
        assert_eq!(out, "hello\u{2026}");
        assert_eq!(out.chars().count(), 6);
    }

    #[test]
    fn truncate_scalars_counts_scalars_not_bytes() {
        // Each "é" below is 2 bytes in UTF-8 but 1 scalar.
        let text = "é".repeat(10);
        let out = truncate_scalars(&text, 5);
        assert_eq!(out.chars().count(), 5);
        assert!(out.ends_with('\u{2026}'));
    }

    #[test]
    fn truncate_scalars_twice_equals_once() {
        let text = "x".repeat(600);
        let once = truncate_scalars(&text, 500);
        let twice = truncate_scalars(&once, 500);
        assert_eq!(once, twice);
    }
}
