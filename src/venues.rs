//! Venue list loading and publication resolution.
//!
//! The venue list is an ordered set of known conference and journal names.
//! It is loaded once by the caller, either from a text file with one name
//! per line or from the builtin list, and passed to the functions here.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Errors that can occur when loading a venue list.
#[derive(Error, Debug)]
pub enum VenueError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Builtin venue names, in match priority order.
///
/// Longer names come before their prefixes ("SIGGRAPH Asia" before
/// "SIGGRAPH") because resolution returns the first venue that matches.
pub const BUILTIN_VENUES: &[&str] = &[
    "CVPR",
    "ICCV",
    "ECCV",
    "NeurIPS",
    "ICLR",
    "ICML",
    "AAAI",
    "IJCAI",
    "SIGGRAPH Asia",
    "SIGGRAPH",
    "TPAMI",
    "TIP",
    "TOG",
    "WACV",
    "BMVC",
    "3DV",
    "ACM MM",
    "ICASSP",
];

/// Returns the builtin venue list.
pub fn builtin_venues() -> Vec<String> {
    BUILTIN_VENUES.iter().map(|v| v.to_string()).collect()
}

/// Loads a venue list from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_venues(path: &Path) -> Result<Vec<String>, VenueError> {
    let content = fs::read_to_string(path)?;
    let venues = parse_venues(&content);
    tracing::debug!(path = %path.display(), venues = venues.len(), "loaded venue list");
    Ok(venues)
}

/// Parses venue names, one per line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
pub fn parse_venues(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Resolves the publication venue of a paper from its free-text comment.
///
/// Venues are tried in list order. For each one, the comment is searched for
/// the venue name followed by the nearest four-digit year on the same line;
/// the first venue with a match wins and the matched text is returned
/// (e.g. "CVPR 2021"). Matching is case-sensitive. Without a match, or
/// without a comment, the paper is still a preprint: `"arXiv <year>"`.
///
/// ```
/// use paperlist_tools::resolve_publication;
///
/// let venues = vec!["CVPR".to_string(), "ECCV".to_string()];
/// let comment = Some("Accepted to CVPR 2021, camera-ready");
/// assert_eq!(resolve_publication(comment, &venues, "2021"), "CVPR 2021");
/// assert_eq!(resolve_publication(Some("12 pages"), &venues, "2022"), "arXiv 2022");
/// ```
pub fn resolve_publication(comment: Option<&str>, venues: &[String], year: &str) -> String {
    if let Some(comment) = comment {
        for venue in venues.iter().filter(|v| !v.is_empty()) {
            let pattern = format!(r"{}.*?\d{{4}}", regex::escape(venue));
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!(venue = %venue, error = %e, "skipping unusable venue name");
                    continue;
                }
            };
            if let Some(m) = re.find(comment) {
                tracing::debug!(venue = %venue, publication = m.as_str(), "resolved publication");
                return m.as_str().to_string();
            }
        }
    }

    format!("arXiv {}", year)
}

/// Splits resolved publication text into a venue and a year.
///
/// The year is the last four-digit run and the venue everything before it,
/// so "SIGGRAPH Asia 2021" gives `("SIGGRAPH Asia", "2021")` and
/// "CVPR Workshop, 2021" gives `("CVPR Workshop", "2021")`.
///
/// Returns `None` when there is no year, nothing before it, or when the
/// venue contains `". "` and so would not parse back from the reading list.
///
/// ```
/// use paperlist_tools::split_publication;
///
/// assert_eq!(
///     split_publication("ACM MM 2022"),
///     Some(("ACM MM".to_string(), "2022".to_string()))
/// );
/// assert_eq!(split_publication("2021"), None);
/// ```
pub fn split_publication(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let year = YEAR_RE.find_iter(text).last()?;
    let venue = text[..year.start()].trim_end_matches(|c: char| c.is_whitespace() || c == ',');
    if venue.is_empty() || venue.contains(". ") {
        return None;
    }
    Some((venue.to_string(), year.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn venues(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    // ============================================
    // Tests for load_venues()
    // ============================================

    #[test]
    fn test_load_venues_from_file() {
        // Given: A venue file with a comment and blank lines
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "# conferences\nCVPR\n\n  ECCV  \nNeurIPS\n").unwrap();
        file.flush().unwrap();

        // When: We load it
        let loaded = load_venues(file.path()).unwrap();

        // Then: Only trimmed names remain, in file order
        assert_eq!(loaded, venues(&["CVPR", "ECCV", "NeurIPS"]));
    }

    #[test]
    fn test_load_venues_missing_file() {
        let result = load_venues(Path::new("/nonexistent/venues.txt"));
        assert!(matches!(result, Err(VenueError::IoError(_))));
    }

    #[test]
    fn test_builtin_venues_prefix_order() {
        let list = builtin_venues();
        let asia = list.iter().position(|v| v == "SIGGRAPH Asia").unwrap();
        let plain = list.iter().position(|v| v == "SIGGRAPH").unwrap();
        assert!(asia < plain);
    }

    // ============================================
    // Tests for resolve_publication()
    // ============================================

    #[test]
    fn test_resolve_publication_match() {
        let list = venues(&["CVPR", "ECCV"]);
        assert_eq!(
            resolve_publication(Some("Accepted to CVPR 2021, camera-ready"), &list, "2021"),
            "CVPR 2021"
        );
    }

    #[test]
    fn test_resolve_publication_fallback() {
        let list = venues(&["CVPR", "ECCV"]);
        assert_eq!(
            resolve_publication(Some("Project page: https://x.io"), &list, "2022"),
            "arXiv 2022"
        );
        assert_eq!(resolve_publication(None, &list, "2022"), "arXiv 2022");
    }

    #[test]
    fn test_resolve_publication_list_order_wins() {
        // Given: The comment mentions ECCV first, but CVPR comes first in the list
        let list = venues(&["CVPR", "ECCV"]);
        let comment = "Extends our ECCV 2020 paper. Accepted to CVPR 2021";

        // Then: The CVPR match is returned
        assert_eq!(resolve_publication(Some(comment), &list, "2021"), "CVPR 2021");
    }

    #[test]
    fn test_resolve_publication_non_greedy() {
        let list = venues(&["NeurIPS"]);
        assert_eq!(
            resolve_publication(Some("NeurIPS Workshop 2021; extended 2022"), &list, "2021"),
            "NeurIPS Workshop 2021"
        );
    }

    #[test]
    fn test_resolve_publication_case_sensitive() {
        let list = venues(&["CVPR"]);
        assert_eq!(
            resolve_publication(Some("accepted at cvpr 2021"), &list, "2021"),
            "arXiv 2021"
        );
    }

    #[test]
    fn test_resolve_publication_escapes_venue_names() {
        let list = venues(&["ACM MM", "C++"]);
        assert_eq!(
            resolve_publication(Some("C++ 2020 proceedings"), &list, "2020"),
            "C++ 2020"
        );
    }

    #[test]
    fn test_resolve_publication_venue_without_year() {
        let list = venues(&["CVPR"]);
        assert_eq!(
            resolve_publication(Some("Submitted to CVPR"), &list, "2023"),
            "arXiv 2023"
        );
    }

    // ============================================
    // Tests for split_publication()
    // ============================================

    #[test]
    fn test_split_publication() {
        assert_eq!(
            split_publication("CVPR 2021"),
            Some(("CVPR".to_string(), "2021".to_string()))
        );
        assert_eq!(
            split_publication("CVPR Workshop 2021"),
            Some(("CVPR Workshop".to_string(), "2021".to_string()))
        );
        assert_eq!(split_publication("CVPR"), None);
        assert_eq!(split_publication(""), None);
    }

    #[test]
    fn test_split_publication_multi_word_venues() {
        assert_eq!(
            split_publication("SIGGRAPH Asia 2021"),
            Some(("SIGGRAPH Asia".to_string(), "2021".to_string()))
        );
        assert_eq!(
            split_publication("ACM MM, 2022"),
            Some(("ACM MM".to_string(), "2022".to_string()))
        );
    }

    #[test]
    fn test_split_publication_rejects_sentence_break() {
        // "CVPR. Code 2021" would end the venue at the first ". " on re-parse
        assert_eq!(split_publication("CVPR. Code released 2021"), None);
    }

    #[test]
    fn test_resolve_then_split_prefers_longer_builtin_name() {
        let publication =
            resolve_publication(Some("Accepted to SIGGRAPH Asia 2021"), &builtin_venues(), "2021");
        assert_eq!(publication, "SIGGRAPH Asia 2021");
        assert_eq!(
            split_publication(&publication),
            Some(("SIGGRAPH Asia".to_string(), "2021".to_string()))
        );
    }
}
