//! Check report types and formatting.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;

use quire::utils::plural_s;

use super::scan::{Finding, Severity};

/// One reported problem, without its severity.
#[derive(Debug, Clone)]
pub struct CheckIssue {
    pub target: String,
    pub reason: String,
}

/// Findings grouped by severity, then by source file.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub errors: BTreeMap<String, Vec<CheckIssue>>,
    pub warnings: BTreeMap<String, Vec<CheckIssue>>,
}

impl CheckReport {
    pub fn add(&mut self, source: &str, finding: Finding) {
        let bucket = match finding.severity {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
        };
        bucket.entry(source.to_string()).or_default().push(CheckIssue {
            target: finding.target,
            reason: finding.reason,
        });
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(|v| v.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(|v| v.len()).sum()
    }

    /// Print the full report to stderr (errors -> warnings).
    pub fn print(&self) {
        print_section("errors", &self.errors, true);
        print_section("warnings", &self.warnings, false);
    }
}

fn print_section(name: &str, issues: &BTreeMap<String, Vec<CheckIssue>>, is_error: bool) {
    if issues.is_empty() {
        return;
    }
    eprintln!();

    let file_count = issues.len();
    let issue_count: usize = issues.values().map(|v| v.len()).sum();
    let heading = if is_error {
        name.red().bold().to_string()
    } else {
        name.yellow().bold().to_string()
    };
    eprintln!(
        "{} {}",
        heading,
        format!(
            "({file_count} file{}, {issue_count} issue{})",
            plural_s(file_count),
            plural_s(issue_count)
        )
        .dimmed()
    );

    for (path, list) in issues {
        eprintln!("{}{}{}", "[".dimmed(), path.cyan(), "]".dimmed());
        for issue in list {
            let arrow = if is_error {
                "→".red().to_string()
            } else {
                "→".yellow().to_string()
            };
            eprintln!("{} {} {}", arrow, issue.target, issue.reason.dimmed());
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.error_count();
        let warnings = self.warning_count();

        if errors == 0 && warnings == 0 {
            return write!(f, "{}", "all checks passed".green());
        }
        write!(
            f,
            "{} {} {}",
            "found".dimmed(),
            errors.to_string().red().bold(),
            format!("error{}", plural_s(errors)).dimmed()
        )?;
        if warnings > 0 {
            write!(
                f,
                "{} {} {}",
                ",".dimmed(),
                warnings.to_string().yellow().bold(),
                format!("warning{}", plural_s(warnings)).dimmed()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity, target: &str) -> Finding {
        Finding {
            severity,
            target: target.into(),
            reason: "r".into(),
        }
    }

    #[test]
    fn test_counts_by_severity() {
        let mut report = CheckReport::default();
        report.add("a.html", finding(Severity::Error, "#x"));
        report.add("a.html", finding(Severity::Error, "#y"));
        report.add("b.html", finding(Severity::Warning, "h3"));

        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors["a.html"][1].target, "#y");
    }

    #[test]
    fn test_summary_line() {
        owo_colors::set_override(false);
        let mut report = CheckReport::default();
        assert_eq!(report.to_string(), "all checks passed");
        report.add("a.html", finding(Severity::Error, "#x"));
        assert_eq!(report.to_string(), "found 1 error");
        owo_colors::unset_override();
    }
}
