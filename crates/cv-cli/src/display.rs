//! Display utilities for CLI output: confidence bars, source tables and
//! colored status lines, grounded on the teacher CLI's `display.rs`
//! (`render_confidence_bar`, `print_error`/`print_warning`/`print_success`).

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use owo_colors::OwoColorize;

use cv_types::{Mode, RagResponse};

/// Render a confidence/progress bar, e.g. `[████████░░] 80%`.
pub fn render_confidence_bar(value: f32, width: usize) -> String {
    let clamped = value.clamp(0.0, 1.0);
    let filled = ((clamped * width as f32).round() as usize).min(width);
    let empty = width - filled;

    let bar = format!("{}{}", "█".repeat(filled).green(), "░".repeat(empty).dimmed());
    format!("[{bar}]")
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print a full `RagResponse`: the answer, a confidence bar, verification
/// status, a source table and per-stage latencies.
pub fn print_response(response: &RagResponse) {
    let mode_label = match response.mode {
        Mode::Local => "💻 Local".green().to_string(),
        Mode::Cloud => "☁️  Cloud".cyan().to_string(),
    };

    println!("{}", "─".repeat(60).dimmed());
    println!("{}", response.answer);
    println!("{}", "─".repeat(60).dimmed());
    println!();

    println!(
        "  {} {} ({:.0}%)",
        "Confidence:".dimmed(),
        render_confidence_bar(response.confidence, 20),
        response.confidence * 100.0
    );
    println!("  {} {}", "Mode:".dimmed(), mode_label);
    println!(
        "  {} {}",
        "Guardrail:".dimmed(),
        if response.guardrail_passed {
            "passed".green().to_string()
        } else {
            "rejected".red().to_string()
        }
    );

    if let Some(verification) = &response.verification {
        let groundedness = verification
            .groundedness
            .map(|g| format!("{:.0}%", g * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {} groundedness {} · heuristic {:.0}% · combined {:.0}%",
            "Verification:".dimmed(),
            groundedness,
            verification.heuristic_confidence * 100.0,
            verification.combined_confidence * 100.0
        );
        if let Some(warning) = &verification.warning {
            print_warning(warning);
        }
    }

    if let Some(structure) = &response.structure {
        if let Some(structure_type) = structure.get("structure_type").and_then(|v| v.as_str()) {
            println!("  {} {}", "Structure:".dimmed(), structure_type);
        }
    }

    println!();
    print_sources_table(&response.sources);
    println!();
    print_metrics(response);
}

fn print_sources_table(sources: &[cv_types::SearchResult]) {
    if sources.is_empty() {
        println!("{}", "No sources retrieved.".dimmed());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["CV", "Section", "Similarity", "Excerpt"]);

    for source in sources {
        let similarity_cell = if source.is_fused_score() {
            Cell::new(format!("{:.2} (fused)", source.similarity)).fg(Color::Yellow)
        } else if source.similarity >= 0.7 {
            Cell::new(format!("{:.2}", source.similarity)).fg(Color::Green)
        } else {
            Cell::new(format!("{:.2}", source.similarity))
        };

        let excerpt: String = source.content.chars().take(80).collect();
        table.add_row(vec![
            Cell::new(&source.filename),
            Cell::new(format!("{:?}", source.section_type)),
            similarity_cell,
            Cell::new(excerpt),
        ]);
    }

    println!("{table}");
}

fn print_metrics(response: &RagResponse) {
    let m = &response.metrics;
    println!(
        "  {} understanding {}ms · embed {}ms · search {}ms · rerank {}ms · \
         generation {}ms · verification {}ms · total {}ms",
        "Latency:".dimmed(),
        m.understanding_ms,
        m.embed_ms,
        m.search_ms,
        m.rerank_ms,
        m.generation_ms,
        m.verification_ms,
        m.total_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_bar_is_fully_filled_at_one() {
        let bar = render_confidence_bar(1.0, 10);
        assert!(!bar.contains('░'));
    }

    #[test]
    fn confidence_bar_is_empty_at_zero() {
        let bar = render_confidence_bar(0.0, 10);
        assert!(!bar.contains('█'));
    }

    #[test]
    fn confidence_bar_clamps_out_of_range_values() {
        let bar = render_confidence_bar(2.0, 10);
        assert!(!bar.contains('░'));
    }
}
