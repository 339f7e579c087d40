use crate::core::report::{RevisionId, ScanReport, ValidationOutcome};
use crate::core::traits::ScanObserver;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn print_banner() {
        println!("{}", "=".repeat(70).bright_cyan());
        println!(
            "{}",
            "  KeySweep - Git History Credential Sweep".bright_cyan().bold()
        );
        println!("{}", "=".repeat(70).bright_cyan());
        println!();
    }

    pub fn print_report(report: &ScanReport) {
        println!();
        println!("{}", "=".repeat(70).bright_cyan());
        println!("{}", "  Sweep Summary".bright_cyan().bold());
        println!("{}", "=".repeat(70).bright_cyan());
        println!();

        println!(
            "  Repository: {}",
            report.repository.bright_white()
        );
        println!(
            "  Revisions scanned: {}  (skipped: {})",
            report.revisions_walked.to_string().bright_white(),
            report.revisions_skipped.to_string().bright_yellow()
        );
        println!(
            "  Unique credential identifiers: {}",
            report.credentials.len().to_string().bright_white()
        );
        if !report.complete {
            println!("  {}", "PARTIAL REPORT - run did not finish".yellow().bold());
        }
        println!();

        let live: Vec<_> = report.live().collect();
        if live.is_empty() {
            println!("  {}", "No live credentials found in this repository.".green());
        } else {
            println!(
                "{}",
                "  ⚠ LIVE CREDENTIALS FOUND - ROTATE IMMEDIATELY".red().bold()
            );
            for (identifier, record) in &live {
                println!("\n  {} {}", "✗".red().bold(), identifier.bright_red().bold());
                for occurrence in &record.occurrences {
                    println!(
                        "      seen at {} in {}",
                        occurrence.revision.short().bright_cyan(),
                        occurrence.file_path.bright_white()
                    );
                }
            }
        }
        println!();

        for (identifier, record) in report.not_live() {
            println!(
                "  {} {} (not live, {} occurrence{})",
                "✓".bright_black(),
                identifier.bright_black(),
                record.occurrences.len(),
                if record.occurrences.len() == 1 { "" } else { "s" }
            );
        }

        for (identifier, record) in report.undetermined() {
            let reason = match &record.outcome {
                Some(ValidationOutcome::Indeterminate(reason)) => reason.as_str(),
                _ => "not validated",
            };
            println!(
                "  {} {} ({})",
                "?".yellow(),
                identifier.yellow(),
                reason.yellow()
            );
        }

        if !report.skipped_revisions.is_empty() {
            println!();
            println!("  {} Skipped revisions:", "⚠".yellow());
            for skipped in &report.skipped_revisions {
                println!(
                    "    {}: {}",
                    skipped.revision.short().bright_cyan(),
                    skipped.cause
                );
            }
        }

        if !report.warnings.is_empty() {
            println!(
                "  {} {} file(s) could not be read; see the JSON report",
                "⚠".yellow(),
                report.warnings.len()
            );
        }

        println!();
        println!("{}", "=".repeat(70).bright_cyan());
    }

    /// Plain-text rendering, for `report --output`.
    pub fn render_text(report: &ScanReport) -> String {
        let mut out = String::new();

        out.push_str("KeySweep Report\n");
        out.push_str(&format!("Generated: {}\n", report.generated_at));
        out.push_str(&format!("Repository: {}\n\n", report.repository));

        out.push_str("Summary:\n");
        out.push_str(&format!("  Revisions scanned: {}\n", report.revisions_walked));
        out.push_str(&format!("  Revisions skipped: {}\n", report.revisions_skipped));
        out.push_str(&format!(
            "  Unique identifiers: {}\n",
            report.credentials.len()
        ));
        out.push_str(&format!("  Complete: {}\n\n", report.complete));

        for (identifier, record) in &report.credentials {
            let outcome = match &record.outcome {
                Some(outcome) => outcome.to_string(),
                None => "not validated".to_string(),
            };
            out.push_str(&format!("[{}] {}\n", outcome, identifier));
            for occurrence in &record.occurrences {
                out.push_str(&format!(
                    "  {} {}\n",
                    occurrence.revision, occurrence.file_path
                ));
            }
        }

        if !report.skipped_revisions.is_empty() {
            out.push_str("\nSkipped revisions:\n");
            for skipped in &report.skipped_revisions {
                out.push_str(&format!("  {}: {}\n", skipped.revision, skipped.cause));
            }
        }

        out
    }

    pub fn print_error(message: &str) {
        eprintln!("{} {}", "✗".bright_red(), message.red());
    }

    pub fn print_warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message.yellow());
    }

    pub fn print_success(message: &str) {
        println!("{} {}", "✓".green(), message.green());
    }

    pub fn print_info(message: &str) {
        println!("{} {}", "•".bright_cyan(), message);
    }
}

/// Progress rendering for a sweep: a revision-count bar, with findings and
/// settled outcomes printed above it as they happen.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(0),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ProgressObserver {
    fn walk_started(&self, total_revisions: usize) {
        self.bar.set_length(total_revisions as u64);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} revisions {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
    }

    fn revision_scanned(&self, revision: &RevisionId, findings: usize) {
        if findings > 0 {
            self.bar.println(format!(
                "  {} {} candidate pair(s) at {}",
                "•".bright_yellow(),
                findings,
                revision.short().bright_cyan()
            ));
        }
        self.bar.set_message(revision.short().to_string());
        self.bar.inc(1);
    }

    fn revision_skipped(&self, revision: &RevisionId) {
        self.bar.println(format!(
            "  {} skipped revision {}",
            "⚠".yellow(),
            revision.short().bright_cyan()
        ));
        self.bar.inc(1);
    }

    fn candidate_admitted(&self, identifier: &str) {
        self.bar.println(format!(
            "  {} validating {}",
            "→".bright_yellow(),
            identifier.bright_cyan()
        ));
    }

    fn outcome_recorded(&self, identifier: &str, outcome: &ValidationOutcome) {
        let line = match outcome {
            ValidationOutcome::Valid => {
                format!("  {} {} is LIVE", "✗".red().bold(), identifier.bright_red())
            }
            ValidationOutcome::Invalid => format!(
                "  {} {} not live",
                "✓".bright_black(),
                identifier.bright_black()
            ),
            ValidationOutcome::Indeterminate(reason) => format!(
                "  {} {} undetermined: {}",
                "?".yellow(),
                identifier.yellow(),
                reason
            ),
        };
        self.bar.println(line);
    }

    fn walk_finished(&self) {
        self.bar.finish_and_clear();
    }
}
