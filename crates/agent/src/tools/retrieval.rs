use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnippet {
    pub source: String,
    pub text: String,
}

struct CorpusEntry {
    source: &'static str,
    keywords: &'static [&'static str],
    text: &'static str,
}

// Guideline excerpts come from carrier packaging documentation; carrier
// brand mentions are rewritten before anything is shown to a user.
const SOURCE_BRAND: &str = "FedEx";
const DISPLAY_BRAND: &str = "GlideLogistics";

const PACKAGING_CORPUS: &[CorpusEntry] = &[
    CorpusEntry {
        source: "packaging_guidelines/box-selection",
        keywords: &["box", "boxes", "size", "sizes", "carton", "corrugated"],
        text: "Choose a new, rigid corrugated box with all flaps intact. FedEx recommends \
               leaving at least 5 cm of cushioning between the contents and every wall of the box.",
    },
    CorpusEntry {
        source: "packaging_guidelines/fragile-items",
        keywords: &["fragile", "glass", "breakable", "cushion", "cushioning", "bubble"],
        text: "Wrap fragile items individually in bubble cushioning and suspend them in the \
               center of the box. Mark the outer packaging as FRAGILE on at least two sides.",
    },
    CorpusEntry {
        source: "packaging_guidelines/weight-limits",
        keywords: &["weight", "heavy", "kg", "kilograms", "limit", "limits"],
        text: "Standard service accepts packages up to 45 kg. Heavier shipments require \
               freight handling and a FedEx account executive to arrange collection.",
    },
    CorpusEntry {
        source: "packaging_guidelines/prohibited-items",
        keywords: &["prohibited", "restricted", "dangerous", "batteries", "battery", "liquids"],
        text: "Lithium batteries, flammable liquids, and perishable goods without approved \
               packaging are prohibited from standard shipment. Check the restricted goods list \
               before booking.",
    },
    CorpusEntry {
        source: "packaging_guidelines/labeling",
        keywords: &["label", "labels", "labeling", "address", "addresses"],
        text: "Place one address label on the largest surface of the package and remove or \
               cover all old labels and barcodes. FedEx labels must stay flat, never folded \
               over an edge.",
    },
    CorpusEntry {
        source: "packaging_guidelines/envelopes",
        keywords: &["envelope", "envelopes", "documents", "document", "paperwork"],
        text: "Use a padded or cardboard envelope for documents up to 0.5 kg. Anything heavier \
               ships more safely in a small box.",
    },
];

/// Keyword retrieval over the built-in packaging-guidelines corpus.
pub struct DocumentIndex;

impl DocumentIndex {
    pub fn builtin() -> Self {
        Self
    }

    /// Returns up to three snippets ranked by keyword overlap with the
    /// question. Idempotent; an unmatched question yields no snippets.
    pub fn query(&self, question: &str) -> Vec<DocumentSnippet> {
        let tokens = tokenize(question);
        let mut scored: Vec<(usize, &CorpusEntry)> = PACKAGING_CORPUS
            .iter()
            .map(|entry| {
                let score = entry
                    .keywords
                    .iter()
                    .filter(|keyword| tokens.iter().any(|token| token == *keyword))
                    .count();
                (score, entry)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.source.cmp(b.1.source)));
        scored
            .into_iter()
            .take(3)
            .map(|(_, entry)| DocumentSnippet {
                source: entry.source.to_string(),
                text: entry.text.replace(SOURCE_BRAND, DISPLAY_BRAND),
            })
            .collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|character: char| !character.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

pub struct RagQueryTool {
    index: Arc<DocumentIndex>,
}

impl RagQueryTool {
    pub fn new(index: Arc<DocumentIndex>) -> Self {
        Self { index }
    }
}

#[derive(Deserialize)]
struct RagQueryArgs {
    query: String,
}

#[async_trait]
impl Tool for RagQueryTool {
    fn name(&self) -> &'static str {
        "rag_query"
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: RagQueryArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::invalid_argument("args", error.to_string()))?;
        let results = self.index.query(&args.query);
        Ok(json!({"results": results}))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{DocumentIndex, RagQueryTool};
    use crate::tools::Tool;

    #[test]
    fn ranks_snippets_by_keyword_overlap() {
        let index = DocumentIndex::builtin();
        let snippets = index.query("what box size should I use for fragile glass?");
        assert!(!snippets.is_empty());
        assert!(snippets.len() <= 3);
        assert!(snippets
            .iter()
            .any(|snippet| snippet.source == "packaging_guidelines/fragile-items"));
    }

    #[test]
    fn rewrites_carrier_brand_before_display() {
        let index = DocumentIndex::builtin();
        let snippets = index.query("box sizes");
        assert!(!snippets.is_empty());
        for snippet in snippets {
            assert!(!snippet.text.contains("FedEx"), "unrewritten brand in {}", snippet.source);
        }
    }

    #[test]
    fn unmatched_question_yields_no_snippets() {
        let index = DocumentIndex::builtin();
        assert!(index.query("tell me a joke").is_empty());
    }

    #[tokio::test]
    async fn invoke_returns_results_list() {
        let tool = RagQueryTool::new(Arc::new(DocumentIndex::builtin()));
        let result = tool.invoke(json!({"query": "weight limit"})).await.expect("success");
        let results = result["results"].as_array().expect("list");
        assert!(!results.is_empty());
    }
}
