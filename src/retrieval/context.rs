//! Character-budgeted context assembly from query matches.

use crate::pinecone::QueryMatch;

/// Divider placed between match texts in the assembled context.
const DIVIDER: &str = "\n---\n";

/// Concatenate match texts into a single context string whose byte length
/// never exceeds `max_chars`, dividers included.
///
/// The budget is accounted in bytes (`str::len`), which can only undershoot a
/// character count, so the returned string also never exceeds `max_chars`
/// characters. Matches are consumed in the order the index returned them
/// (descending score, ties in native order). Assembly stops at the first
/// match that would push the running total past the budget; that match is
/// dropped whole rather than truncated mid-sentence. Matches without stored
/// text are skipped.
pub(crate) fn assemble_context(matches: &[QueryMatch], max_chars: usize) -> String {
    let mut context = String::new();
    for entry in matches {
        let Some(text) = entry.metadata.as_ref().map(|meta| meta.text.as_str()) else {
            tracing::debug!(id = %entry.id, "Match has no stored text; skipping");
            continue;
        };

        let added = if context.is_empty() {
            text.len()
        } else {
            DIVIDER.len() + text.len()
        };
        if context.len() + added > max_chars {
            break;
        }

        if !context.is_empty() {
            context.push_str(DIVIDER);
        }
        context.push_str(text);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinecone::ChunkMetadata;

    fn query_match(text: &str, score: f32) -> QueryMatch {
        QueryMatch {
            id: format!("doc_{score}"),
            score,
            metadata: Some(ChunkMetadata {
                text: text.to_string(),
                source: "doc.pdf".into(),
                chunk_index: 1,
            }),
        }
    }

    #[test]
    fn stops_before_budget_overflow() {
        let matches = vec![
            query_match(&"a".repeat(20), 0.9),
            query_match(&"b".repeat(20), 0.8),
            query_match(&"c".repeat(20), 0.7),
        ];
        // 20 + 5 + 20 = 45 fits; adding the third (70) would not.
        let context = assemble_context(&matches, 50);
        assert!(context.len() <= 50);
        assert!(context.contains(&"a".repeat(20)));
        assert!(context.contains(&"b".repeat(20)));
        assert!(!context.contains(&"c".repeat(20)));
    }

    #[test]
    fn oversized_match_is_dropped_not_truncated() {
        let matches = vec![query_match(&"x".repeat(100), 0.9)];
        assert_eq!(assemble_context(&matches, 50), "");
    }

    #[test]
    fn preserves_index_return_order() {
        let matches = vec![query_match("first", 0.5), query_match("second", 0.5)];
        assert_eq!(assemble_context(&matches, 100), "first\n---\nsecond");
    }

    #[test]
    fn budget_is_accounted_in_bytes() {
        // Two-byte characters: 8 bytes of text but only 4 characters.
        let matches = vec![query_match("éééé", 0.9)];
        assert_eq!(assemble_context(&matches, 7), "");
        assert_eq!(assemble_context(&matches, 8), "éééé");
    }

    #[test]
    fn empty_matches_produce_empty_context() {
        assert_eq!(assemble_context(&[], 100), "");
    }

    #[test]
    fn matches_without_metadata_are_skipped() {
        let matches = vec![
            QueryMatch {
                id: "bare".into(),
                score: 0.9,
                metadata: None,
            },
            query_match("kept", 0.8),
        ];
        assert_eq!(assemble_context(&matches, 100), "kept");
    }
}
