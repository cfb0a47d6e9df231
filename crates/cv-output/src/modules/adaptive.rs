//! Adaptive dynamic table (spec §4.10): used when the query type matches
//! none of the other nine structures. Picks its columns from keywords in
//! the query text rather than a fixed schema, then computes a distribution
//! analysis over whichever column holds the repeated/countable values.
//!
//! Grounded on `original_source/.../output_processor/structures/adaptive_structure.py`
//! (column-keyword dispatch table) and `crate::modules::skill::distribution`
//! for the counting shape.

use std::collections::HashMap;

use cv_types::EnrichedMetadata;

/// One column the adaptive table can render. Order here is the keyword
/// match priority when a query names more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveColumn {
    Skills,
    Languages,
    Experience,
    Education,
    Location,
    Certifications,
}

impl AdaptiveColumn {
    pub fn label(self) -> &'static str {
        match self {
            AdaptiveColumn::Skills => "Skills",
            AdaptiveColumn::Languages => "Languages",
            AdaptiveColumn::Experience => "Experience",
            AdaptiveColumn::Education => "Education",
            AdaptiveColumn::Location => "Location",
            AdaptiveColumn::Certifications => "Certifications",
        }
    }

    fn values(self, metadata: &EnrichedMetadata) -> Vec<String> {
        match self {
            AdaptiveColumn::Skills => metadata.skills.clone(),
            AdaptiveColumn::Languages => metadata.languages.clone(),
            AdaptiveColumn::Experience => vec![format!("{:.1}y", metadata.total_experience_years)],
            AdaptiveColumn::Education => metadata
                .education_field
                .clone()
                .into_iter()
                .chain(metadata.education_institution.clone())
                .collect(),
            AdaptiveColumn::Location => metadata.location.clone().into_iter().collect(),
            AdaptiveColumn::Certifications => metadata.certifications.clone(),
        }
    }
}

/// Scans the query text for column keywords, in priority order, and
/// returns every column it matched. Falls back to `[Skills]` when the
/// query names none of them — every session has a talent pool, so "tell
/// me about these candidates" still renders something.
pub fn columns_for_query(query: &str) -> Vec<AdaptiveColumn> {
    let lower = query.to_lowercase();
    let mut matched = Vec::new();
    let candidates: &[(&str, AdaptiveColumn)] = &[
        ("language", AdaptiveColumn::Languages),
        ("speak", AdaptiveColumn::Languages),
        ("skill", AdaptiveColumn::Skills),
        ("experience", AdaptiveColumn::Experience),
        ("years", AdaptiveColumn::Experience),
        ("education", AdaptiveColumn::Education),
        ("degree", AdaptiveColumn::Education),
        ("location", AdaptiveColumn::Location),
        ("based", AdaptiveColumn::Location),
        ("certif", AdaptiveColumn::Certifications),
    ];
    for (keyword, column) in candidates {
        if lower.contains(keyword) && !matched.contains(column) {
            matched.push(*column);
        }
    }
    if matched.is_empty() {
        matched.push(AdaptiveColumn::Skills);
    }
    matched
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdaptiveRow {
    pub candidate_name: String,
    /// One rendered string per column in `AdaptiveTable::columns`.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdaptiveTable {
    pub columns: Vec<String>,
    pub rows: Vec<AdaptiveRow>,
    /// Count of each distinct value across the primary (first) column,
    /// sorted by frequency descending — spec §8 scenario 5.
    pub distribution: Vec<(String, u32)>,
}

/// Builds the table for `columns_for_query(query)` over `candidates`.
/// `candidates` is `(candidate_name, metadata)`, same shape every other
/// module in this crate uses.
pub fn build(query: &str, candidates: &[(String, EnrichedMetadata)]) -> AdaptiveTable {
    let columns = columns_for_query(query);
    let rows: Vec<AdaptiveRow> = candidates
        .iter()
        .map(|(name, metadata)| AdaptiveRow {
            candidate_name: name.clone(),
            cells: columns.iter().map(|c| c.values(metadata).join(", ")).collect(),
        })
        .collect();

    let primary = columns[0];
    let mut counts: HashMap<String, u32> = HashMap::new();
    for (_, metadata) in candidates {
        for value in primary.values(metadata) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    let mut distribution: Vec<(String, u32)> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    AdaptiveTable {
        columns: std::iter::once("Candidate".to_string())
            .chain(columns.iter().map(|c| c.label().to_string()))
            .collect(),
        rows,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(languages: &[&str]) -> EnrichedMetadata {
        EnrichedMetadata {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn languages_query_picks_languages_column() {
        let columns = columns_for_query("What languages do candidates speak?");
        assert_eq!(columns, vec![AdaptiveColumn::Languages]);
    }

    #[test]
    fn unmatched_query_falls_back_to_skills() {
        let columns = columns_for_query("tell me about the team");
        assert_eq!(columns, vec![AdaptiveColumn::Skills]);
    }

    #[test]
    fn distribution_matches_spec_scenario_5() {
        let candidates = vec![
            ("Alice".to_string(), meta(&["English", "French"])),
            ("Bob".to_string(), meta(&["English"])),
            ("Carol".to_string(), meta(&["Spanish"])),
        ];
        let table = build("What languages do candidates speak?", &candidates);
        assert_eq!(table.columns, vec!["Candidate".to_string(), "Languages".to_string()]);
        assert_eq!(table.rows.len(), 3);
        let dist: HashMap<_, _> = table.distribution.into_iter().collect();
        assert_eq!(dist.get("English"), Some(&2));
        assert_eq!(dist.get("French"), Some(&1));
        assert_eq!(dist.get("Spanish"), Some(&1));
    }
}
