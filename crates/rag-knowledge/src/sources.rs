//! Source extraction from retrieval results (§4.3.1).

use rag_core::models::Source;

use crate::types::RetrievalResult;

/// Metadata keys tried in order to find an object locator for a result.
const LOCATOR_KEYS: &[&str] = &[
    "s3Uri", "s3URI", "s3url", "uri", "source", "path", "location", "document_path",
];

/// Metadata keys tried, if no locator was found, for a bare file name.
const NAME_KEYS: &[&str] = &["fileName", "filename", "name"];

fn basename(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}

fn document_id_from_file_name(file_name: &str) -> String {
    file_name.strip_suffix(".txt").unwrap_or(file_name).to_string()
}

/// Builds one `Source` per non-empty retrieval result, index `i` used only
/// for the synthetic fallback values `document-{i+1}` / `doc-{i+1}`.
pub fn extract_sources(results: &[RetrievalResult]) -> Vec<Source> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.content_text.trim().is_empty())
        .map(|(i, r)| extract_one(i, r))
        .collect()
}

fn extract_one(index: usize, result: &RetrievalResult) -> Source {
    let mut file_name = None;
    let mut document_id = None;

    for key in LOCATOR_KEYS {
        if let Some(locator) = result.metadata.get(*key).and_then(|v| v.as_str()) {
            let name = basename(locator).to_string();
            document_id = Some(document_id_from_file_name(&name));
            file_name = Some(name);
            break;
        }
    }

    if file_name.is_none() {
        for key in NAME_KEYS {
            if let Some(name) = result.metadata.get(*key).and_then(|v| v.as_str()) {
                file_name = Some(name.to_string());
                break;
            }
        }
    }

    let file_name = file_name.unwrap_or_else(|| format!("document-{}", index + 1));
    let document_id = document_id.unwrap_or_else(|| format!("doc-{}", index + 1));

    Source {
        document_id,
        file_name,
        excerpt: result.content_text.clone(),
        confidence: result.score.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn result(metadata: HashMap<String, serde_json::Value>, text: &str, score: Option<f64>) -> RetrievalResult {
        RetrievalResult {
            content_text: text.to_string(),
            score,
            metadata,
        }
    }

    #[test]
    fn extracts_from_s3_uri_locator() {
        let mut meta = HashMap::new();
        meta.insert("s3Uri".to_string(), json!("s3://bucket/documents/abc/notes.txt"));
        let r = result(meta, "some excerpt", Some(0.8));
        let sources = extract_sources(&[r]);
        assert_eq!(sources[0].file_name, "notes.txt");
        assert_eq!(sources[0].document_id, "notes");
        assert_eq!(sources[0].confidence, 0.8);
    }

    #[test]
    fn falls_back_to_name_keys_when_no_locator() {
        let mut meta = HashMap::new();
        meta.insert("fileName".to_string(), json!("readme.md"));
        let r = result(meta, "excerpt", None);
        let sources = extract_sources(&[r]);
        assert_eq!(sources[0].file_name, "readme.md");
        assert_eq!(sources[0].document_id, "doc-1");
        assert_eq!(sources[0].confidence, 0.0);
    }

    #[test]
    fn falls_back_to_synthetic_values_when_metadata_empty() {
        let r = result(HashMap::new(), "excerpt", None);
        let sources = extract_sources(&[r]);
        assert_eq!(sources[0].file_name, "document-1");
        assert_eq!(sources[0].document_id, "doc-1");
    }

    #[test]
    fn skips_results_with_empty_text() {
        let r = result(HashMap::new(), "   ", None);
        assert!(extract_sources(&[r]).is_empty());
    }
}
