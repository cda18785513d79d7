//! Advisory consistency check between documents and the specification

use crate::model::{ConsistencyReport, GeneratedDocument, SpecDocument};
use crate::stages::significant_words;
use std::collections::HashSet;

/// Overlap below which a document is flagged
const MIN_OVERLAP: f64 = 0.1;

/// Score each document by how much of the specification's vocabulary it uses
///
/// Returns `None` when there are no documents to compare.
#[must_use]
pub fn check(specification: &SpecDocument, documents: &[GeneratedDocument]) -> Option<ConsistencyReport> {
    if documents.is_empty() {
        return None;
    }

    let spec_text = specification
        .requirements
        .iter()
        .map(|r| r.statement.as_str())
        .chain(specification.design.iter().map(|s| s.body.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    let vocabulary: HashSet<String> = significant_words(&spec_text, 5).into_iter().collect();

    let mut warnings = Vec::new();
    let mut total = 0.0;
    for document in documents {
        let ratio = overlap(&vocabulary, &document.content);
        if ratio < MIN_OVERLAP {
            warnings.push(format!(
                "{} shares little vocabulary with the specification ({:.0}% overlap)",
                document.kind.title(),
                ratio * 100.0
            ));
        }
        total += ratio;
    }

    #[allow(clippy::cast_precision_loss)]
    let score = total / documents.len() as f64;
    Some(ConsistencyReport { score, warnings })
}

#[allow(clippy::cast_precision_loss)]
fn overlap(vocabulary: &HashSet<String>, content: &str) -> f64 {
    if vocabulary.is_empty() {
        return 1.0;
    }
    let words: HashSet<String> = significant_words(content, 5).into_iter().collect();
    vocabulary.intersection(&words).count() as f64 / vocabulary.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DesignSection, Priority, Requirement};
    use crate::types::DocumentKind;
    use chrono::Utc;

    fn spec() -> SpecDocument {
        SpecDocument {
            feature_name: "checkout".into(),
            requirements: vec![Requirement {
                id: "REQ-1".into(),
                statement: "THE SYSTEM SHALL process checkout payments securely".into(),
                priority: Priority::High,
                operation_id: "op-checkout".into(),
            }],
            design: vec![DesignSection {
                title: "Overview".into(),
                body: "Hosted payments provider integration".into(),
            }],
            tasks: Vec::new(),
        }
    }

    fn doc(kind: DocumentKind, content: &str) -> GeneratedDocument {
        GeneratedDocument {
            kind,
            title: String::new(),
            content: content.into(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn no_documents_no_report() {
        assert!(check(&spec(), &[]).is_none());
    }

    #[test]
    fn unrelated_document_is_flagged() {
        let report = check(
            &spec(),
            &[
                doc(DocumentKind::PrFaq, "Secure checkout payments through a hosted provider"),
                doc(DocumentKind::CompetitiveAnalysis, "Weather forecast for tomorrow"),
            ],
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Competitive Analysis"));
        assert!(report.score > 0.0 && report.score < 1.0);
    }
}
