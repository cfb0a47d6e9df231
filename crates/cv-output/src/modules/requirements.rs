//! Requirements-table and results-table modules — shared table shaping
//! used by the job-match and search structures.
//!
//! Grounded on `original_source/.../requirements_module.py` and
//! `results_table_module.py`.

use cv_types::{SearchResult, TableRow};

/// One row per stated requirement, with the count of retrieved candidates
/// that mention it anywhere in their indexed chunks.
pub fn requirements_table(requirements: &[String], results: &[SearchResult]) -> Vec<(String, u32)> {
    requirements
        .iter()
        .map(|req| {
            let needle = req.to_lowercase();
            let count = results
                .iter()
                .filter(|r| r.content.to_lowercase().contains(&needle) || r.metadata.skills.iter().any(|s| s.to_lowercase().contains(&needle)))
                .count() as u32;
            (req.clone(), count)
        })
        .collect()
}

/// Builds a fallback results table directly from retrieved chunks when no
/// LLM-authored markdown table is available (mirrors the output
/// processor's own fallback, but usable standalone by the search
/// structure for a first-pass table before generation runs).
pub fn results_table(results: &[SearchResult]) -> Vec<TableRow> {
    let mut seen = std::collections::HashSet::new();
    let mut rows = Vec::new();
    for result in results {
        let name = result
            .metadata
            .current_role
            .clone()
            .map(|role| format!("{} ({role})", result.filename))
            .unwrap_or_else(|| result.filename.clone());
        let key = name.to_lowercase();
        if !seen.insert(key) {
            continue;
        }
        let mut row = TableRow::new(name);
        row.cv_id = Some(result.cv_id.clone());
        row.match_score = Some((result.similarity.min(1.0) * 100.0).clamp(0.0, 100.0));
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::{EnrichedMetadata, SectionType};

    fn sample(cv_id: &str, content: &str) -> SearchResult {
        SearchResult {
            cv_id: cv_id.to_string(),
            chunk_id: format!("{cv_id}-0"),
            section_type: SectionType::Experience,
            content: content.to_string(),
            metadata: EnrichedMetadata::default(),
            similarity: 0.8,
            filename: format!("{cv_id}.pdf"),
        }
    }

    #[test]
    fn counts_requirement_mentions() {
        let results = vec![sample("cv1", "worked with rust and postgres")];
        let table = requirements_table(&["rust".to_string(), "cobol".to_string()], &results);
        assert_eq!(table[0].1, 1);
        assert_eq!(table[1].1, 0);
    }

    #[test]
    fn results_table_dedups_by_name() {
        let results = vec![sample("cv1", "x"), sample("cv1", "y")];
        let table = results_table(&results);
        assert_eq!(table.len(), 1);
    }
}
