use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use unimerge::{InstallSubstitution, MergeOptions, MergeReport};

/// JSON output structure for a finished run
#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    first: String,
    second: String,
    merged: String,
    errors: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_condition: Option<&'a str>,
    install_substitutions: &'a [InstallSubstitution],
    mismatch_count: usize,
    #[serde(flatten)]
    report: &'a MergeReport,
}

/// Handles the display of run parameters and the final report
pub struct SummaryDisplay<'a> {
    first: &'a Path,
    second: &'a Path,
    merged: &'a Path,
    options: &'a MergeOptions,
}

impl<'a> SummaryDisplay<'a> {
    pub fn new(first: &'a Path, second: &'a Path, merged: &'a Path, options: &'a MergeOptions) -> Self {
        Self {
            first,
            second,
            merged,
            options,
        }
    }

    /// Display the inputs and configuration before merging
    pub fn show_banner(&self) {
        println!("{} {}", "first installation:".bright_cyan(), self.first.display());
        println!("{} {}", "second installation:".bright_cyan(), self.second.display());
        println!("{} {}", "merged result:".bright_cyan(), self.merged.display());
        if let Some(condition) = &self.options.header_condition {
            println!("{} {}", "header condition:".bright_cyan(), condition.bright_white());
        }

        let substitutions = &self.options.install_substitutions;
        if !substitutions.is_empty() {
            println!(
                "{}",
                format!("install substitutions ({})", substitutions.len()).bright_cyan()
            );
            for subst in substitutions {
                println!(
                    "  {} / {} {} {}",
                    subst.first.yellow(),
                    subst.second.yellow(),
                    "->".white(),
                    subst.merged.bright_green()
                );
            }
        }
    }

    /// Display warnings and the list of entries that fell back
    pub fn show_report(&self, report: &MergeReport) {
        if report.missing_header_condition {
            println!(
                "{} encountered differing header files, but --header_condition was not given - cannot merge",
                "WARNING:".bright_yellow().bold()
            );
        }

        println!("{}", "merge complete".bright_green().bold());

        if report.is_clean() {
            return;
        }

        let count = report.mismatches.len();
        println!(
            "{} {} {} could not be merged:",
            "WARNING:".bright_yellow().bold(),
            count.to_string().bright_red().bold(),
            if count == 1 { "file" } else { "files" }
        );
        for path in &report.mismatches {
            println!("  {} {}", "→".bright_red(), path.display().to_string().yellow());
        }
    }

    /// Print the report as JSON
    pub fn show_json(&self, report: &MergeReport, errors: &Path) {
        let output = SummaryOutput {
            first: self.first.display().to_string(),
            second: self.second.display().to_string(),
            merged: self.merged.display().to_string(),
            errors: errors.display().to_string(),
            header_condition: self.options.header_condition.as_deref(),
            install_substitutions: &self.options.install_substitutions,
            mismatch_count: report.mismatches.len(),
            report,
        };

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        }
    }
}

