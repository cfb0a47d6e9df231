//! Output Processor (C10)
//!
//! Decomposes an LLM's free-text markdown answer into a
//! [`StructuredOutput`]: a `:::thinking:::...:::`/`:::conclusion:::...:::`
//! delimited internal-reasoning/conclusion split, a direct-answer
//! extraction with a contamination fallback, any markdown table (parsed
//! with a match-score extraction cascade and name-based row
//! deduplication), and `cv:`-scheme candidate references.
//!
//! Grounded on `original_source/.../output_processor/modules/table_module.py`
//! (table parsing cascade) and the sibling `thinking_module.py` /
//! `direct_answer_module.py` / `conclusion_module.py` (delimiter parsing).

use once_cell::sync::Lazy;
use regex::Regex;

use cv_types::{SearchResult, StructuredOutput, TableRow};

static THINKING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s):::thinking:::\s*(.*?)\s*:::").unwrap());
static CONCLUSION_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s):::conclusion:::\s*(.*?)\s*(?::::|\z)").unwrap());
static ANALYSIS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^#{1,3}\s*analysis\s*\n(.*?)(?:\n#{1,3}\s|\z)").unwrap());
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:markdown)?\s*\n(.*?)```").unwrap());
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|(.+)\|\s*$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s|:-]+$").unwrap());
static CV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(cv:([a-zA-Z0-9_-]+)\)").unwrap());
static PERCENT_SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").unwrap());
static STAR_SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(⭐+)").unwrap());

const DIRECT_ANSWER_MAX_CHARS: usize = 600;

pub struct OutputProcessor;

impl OutputProcessor {
    /// `fallback_results` feeds [`fallback_table`] when no markdown table
    /// can be parsed out of `raw`.
    pub fn process(raw: &str, fallback_results: &[SearchResult]) -> StructuredOutput {
        let mut warnings = Vec::new();

        let thinking = THINKING_BLOCK.captures(raw).map(|c| c[1].trim().to_string());
        let conclusion = CONCLUSION_BLOCK.captures(raw).map(|c| c[1].trim().to_string());
        let analysis = ANALYSIS_HEADER.captures(raw).map(|c| c[1].trim().to_string());

        let stripped = strip_blocks(raw);
        let cv_references = extract_cv_references(raw);

        let (table_data, fallback_used) = match parse_markdown_table(&stripped) {
            Some(rows) if !rows.is_empty() => (Some(rows), false),
            _ => {
                if fallback_results.is_empty() {
                    warnings.push("no markdown table found and no fallback chunks available".to_string());
                    (None, false)
                } else {
                    warnings.push("no markdown table found in response, synthesized one from retrieved chunks".to_string());
                    (Some(fallback_table(fallback_results)), true)
                }
            }
        };

        let direct_answer = extract_direct_answer(&stripped, conclusion.as_deref(), &mut warnings);

        StructuredOutput {
            direct_answer,
            raw_content: raw.to_string(),
            thinking,
            analysis,
            conclusion,
            table_data,
            cv_references,
            parsing_warnings: warnings,
            fallback_used,
        }
    }
}

fn strip_blocks(raw: &str) -> String {
    let without_thinking = THINKING_BLOCK.replace_all(raw, "");
    CONCLUSION_BLOCK.replace_all(&without_thinking, "").trim().to_string()
}

fn extract_cv_references(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for capture in CV_REFERENCE.captures_iter(raw) {
        let id = capture[2].to_string();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Takes the first non-empty, non-heading, non-table paragraph as the
/// direct answer. Falls back to the conclusion, then to a canned message,
/// if the candidate paragraph is itself a leftover table/heading fragment
/// (a parsing contamination the teacher's Python called out explicitly).
fn extract_direct_answer(stripped: &str, conclusion: Option<&str>, warnings: &mut Vec<String>) -> String {
    for paragraph in stripped.split("\n\n") {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with('|') || trimmed.starts_with("```") {
            continue;
        }
        return truncate_chars(trimmed, DIRECT_ANSWER_MAX_CHARS);
    }

    warnings.push("direct answer paragraph was contaminated with markup, falling back".to_string());
    if let Some(conclusion) = conclusion {
        if !conclusion.is_empty() {
            return truncate_chars(conclusion, DIRECT_ANSWER_MAX_CHARS);
        }
    }
    "See the detailed breakdown below.".to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push('\u{2026}');
        out
    }
}

/// Code-fence extraction, then markdown-table-region detection: finds the
/// widest contiguous run of `| ... |` rows (skipping the `---` separator
/// row), and parses each into a [`TableRow`].
fn parse_markdown_table(text: &str) -> Option<Vec<TableRow>> {
    let body = CODE_FENCE.captures(text).map(|c| c[1].to_string()).unwrap_or_else(|| text.to_string());

    let rows: Vec<&str> = body
        .lines()
        .filter(|l| TABLE_ROW.is_match(l))
        .collect();
    if rows.len() < 2 {
        return None;
    }

    let header_cells = split_cells(rows[0]);
    let name_col = header_cells
        .iter()
        .position(|h| h.to_lowercase().contains("name") || h.to_lowercase().contains("candidate"))
        .unwrap_or(0);

    let mut parsed: Vec<TableRow> = Vec::new();
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for raw_row in rows.iter().skip(1) {
        if TABLE_SEPARATOR.is_match(raw_row.trim_matches(|c| c == '|')) {
            continue;
        }
        let cells = split_cells(raw_row);
        if cells.is_empty() {
            continue;
        }
        let name = cells.get(name_col).cloned().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let mut row = TableRow::new(strip_bold(&name));
        row.columns = header_cells
            .iter()
            .zip(cells.iter())
            .map(|(h, v)| (h.clone(), strip_bold(v)))
            .collect();
        row.match_score = extract_match_score(&cells.join(" "));

        let key = row.dedup_key();
        if let Some(&existing_idx) = seen.get(&key) {
            let existing: &TableRow = &parsed[existing_idx];
            let should_replace = match (row.match_score, existing.match_score) {
                (Some(new), Some(old)) => new > old,
                (Some(_), None) => true,
                _ => false,
            };
            if should_replace {
                parsed[existing_idx] = row;
            }
        } else {
            seen.insert(key, parsed.len());
            parsed.push(row);
        }
    }

    Some(parsed)
}

fn split_cells(row: &str) -> Vec<String> {
    row.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

fn strip_bold(s: &str) -> String {
    s.trim_matches('*').trim().to_string()
}

/// Match-score extraction cascade: a literal `NN%`, else a run of star
/// characters (20 points each, capped at 100), else a text qualifier
/// ("excellent"/"strong"/"good"/"fair"/"weak"/"poor"). Always clamped to
/// `[0, 100]`.
fn extract_match_score(cell_text: &str) -> Option<f32> {
    if let Some(c) = PERCENT_SCORE.captures(cell_text) {
        return c[1].parse::<f32>().ok().map(|v| v.clamp(0.0, 100.0));
    }
    if let Some(c) = STAR_SCORE.captures(cell_text) {
        let stars = c[1].chars().count() as f32;
        return Some((stars * 20.0).clamp(0.0, 100.0));
    }
    let lower = cell_text.to_lowercase();
    let qualifiers: &[(&str, f32)] = &[
        ("excellent", 95.0),
        ("strong", 85.0),
        ("good", 75.0),
        ("fair", 55.0),
        ("weak", 35.0),
        ("poor", 15.0),
    ];
    qualifiers
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, score)| *score)
}

/// Synthesizes a results table directly from retrieved chunks when the
/// LLM's markdown answer had no parseable table at all.
pub fn fallback_table(results: &[SearchResult]) -> Vec<TableRow> {
    crate::modules::requirements::results_table(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::{EnrichedMetadata, SectionType};

    #[test]
    fn extracts_thinking_and_conclusion_blocks() {
        let raw = ":::thinking:::\nweighing candidates\n:::\nSome answer.\n:::conclusion:::\nJane is the best fit.";
        let output = OutputProcessor::process(raw, &[]);
        assert_eq!(output.thinking.as_deref(), Some("weighing candidates"));
        assert_eq!(output.conclusion.as_deref(), Some("Jane is the best fit."));
    }

    #[test]
    fn parses_table_with_percent_scores_and_dedups_by_name() {
        let raw = "| Name | Match |\n|---|---|\n| **Jane Doe** | 92% |\n| Jane Doe | 40% |\n";
        let output = OutputProcessor::process(raw, &[]);
        let rows = output.table_data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].match_score, Some(92.0));
    }

    #[test]
    fn falls_back_to_chunks_when_no_table_present() {
        let result = SearchResult {
            cv_id: "cv1".to_string(),
            chunk_id: "cv1-0".to_string(),
            section_type: SectionType::Summary,
            content: "Rust engineer".to_string(),
            metadata: EnrichedMetadata::default(),
            similarity: 0.9,
            filename: "jane.pdf".to_string(),
        };
        let output = OutputProcessor::process("No table here, just prose.", &[result]);
        assert!(output.fallback_used);
        assert!(output.table_data.is_some());
    }

    #[test]
    fn extracts_cv_references() {
        let raw = "See [Jane Doe](cv:cv_abc123) for details.";
        let output = OutputProcessor::process(raw, &[]);
        assert_eq!(output.cv_references, vec!["cv_abc123".to_string()]);
    }
}
