//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the dossier CLI.

use crate::knowledge::Readiness;
use crate::types::SearchResult;
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print one numbered search hit
    pub fn search_result(&self, index: usize, result: &SearchResult) {
        if self.colored {
            println!(
                "  {} {}\n     {}\n     {}",
                format!("{:>2}.", index).dimmed(),
                result.title.bright_white().bold(),
                result.url.cyan().underline(),
                result.excerpt.dimmed()
            );
        } else {
            println!(
                "  {:>2}. {}\n     {}\n     {}",
                index, result.title, result.url, result.excerpt
            );
        }
    }

    /// Print the readiness verdict for report writing
    pub fn readiness(&self, readiness: &Readiness) {
        match readiness {
            Readiness::Insufficient { n_docs, min_docs } => self.warning(&format!(
                "{} of at least {} documents acquired; not enough to write a report",
                n_docs, min_docs
            )),
            Readiness::Sufficient {
                n_docs,
                target_reached: true,
            } => self.success(&format!("{} documents acquired; target reached", n_docs)),
            Readiness::Sufficient { n_docs, .. } => self.success(&format!(
                "{} documents acquired; enough to write a report",
                n_docs
            )),
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        let result = SearchResult {
            title: "Rust".to_string(),
            url: "https://rust-lang.org".to_string(),
            excerpt: "A language".to_string(),
        };

        for output in [Output::no_color(), Output::new()] {
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.header("Test Header");
            output.search_result(1, &result);
            output.readiness(&Readiness::Insufficient {
                n_docs: 1,
                min_docs: 3,
            });
            output.readiness(&Readiness::Sufficient {
                n_docs: 5,
                target_reached: true,
            });
            output.hint("hint message");
        }
    }
}
