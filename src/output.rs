//! Output assembly for rendered entries.
//!
//! Rendering functions produce bare entries; this module adds the framing a
//! written file needs (`thebibliography` environment, trailing newline) and
//! formats validation reports.

use crate::markdown::DocumentError;

/// Generates the final output text.
///
/// # Returns
///
/// The content ending in exactly one newline. Empty content yields an empty
/// string so that an empty reading list writes an empty file.
pub fn generate_output(content: &str) -> String {
    let content = content.trim_end();
    if content.is_empty() {
        return String::new();
    }

    let mut output = String::with_capacity(content.len() + 1);
    output.push_str(content);
    output.push('\n');
    output
}

/// Wraps bibliography items in a LaTeX `thebibliography` environment.
///
/// `count` is used as the widest-label argument, matching what BibTeX
/// writes into generated `.bbl` files.
pub fn wrap_thebibliography(items: &str, count: usize) -> String {
    format!(
        "\\begin{{thebibliography}}{{{}}}\n\n{}\n\n\\end{{thebibliography}}",
        count,
        items.trim_end()
    )
}

/// Formats a validation report, one line per failing record.
pub fn format_failures(failures: &[&DocumentError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
