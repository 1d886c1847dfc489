//! Paper record value types.
//!
//! A `PaperRecord` is what one Markdown block of the reading list parses
//! into. Records are plain values: every transformation in this crate takes
//! a record by reference and hands back a new one.

/// One author of a paper, as written in the reading list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Full name in "First Last" order (e.g., "Jane Q Doe")
    pub name: String,
    /// Homepage from a `[Name](url)` link, if the list had one
    pub homepage: Option<String>,
    /// Text right after the homepage link in the same entry (e.g. "†")
    pub marker: String,
}

impl Author {
    /// Creates an author without a homepage link.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homepage: None,
            marker: String::new(),
        }
    }

    /// Returns the family name: the last whitespace-separated token.
    pub fn family_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or_default()
    }

    /// Returns the name in "Last, First" order.
    ///
    /// The last whitespace-separated token is treated as the family name and
    /// everything before it as given names: "Jane Q Doe" becomes
    /// "Doe, Jane Q". Single-token names are returned unchanged.
    pub fn last_first(&self) -> String {
        let parts: Vec<&str> = self.name.split_whitespace().collect();
        match parts.split_last() {
            Some((last, given)) if !given.is_empty() => {
                format!("{}, {}", last, given.join(" "))
            }
            Some((last, _)) => (*last).to_string(),
            None => String::new(),
        }
    }
}

/// Text that follows `<br>` on the title and authors lines.
///
/// Usually empty, but some writers leave a trailing space there. Kept so the
/// two lines render back exactly as they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEndings {
    pub title: String,
    pub authors: String,
}

/// A single paper parsed from the reading list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    /// Display title without the trailing period
    pub title: String,
    /// Authors in reading-list order
    pub authors: Vec<Author>,
    /// Short venue token (e.g., "CVPR", "arXiv", "TPAMI")
    pub venue: String,
    /// Four-digit publication year
    pub year: String,
    /// Numeric paper identifier (e.g., "2103.11536")
    pub identifier: String,
    /// Link tokens following the publication info, in order
    pub links: Vec<String>,
    pub endings: LineEndings,
}

impl PaperRecord {
    /// Returns the BibTeX author field: every author in "Last, First" form,
    /// joined with `" and "`.
    pub fn author_field(&self) -> String {
        self.authors
            .iter()
            .map(Author::last_first)
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Returns author names in reading-list order joined with `", "`.
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the record is still listed as an arXiv preprint.
    pub fn is_preprint(&self) -> bool {
        self.venue.eq_ignore_ascii_case("arxiv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PaperRecord {
        PaperRecord {
            title: "Neural Fields".to_string(),
            authors: vec![Author::new("Jane Q Doe"), Author::new("Wei Li")],
            venue: "arXiv".to_string(),
            year: "2021".to_string(),
            identifier: "2103.11536".to_string(),
            links: vec![],
            endings: LineEndings::default(),
        }
    }

    #[test]
    fn test_last_first_multiple_given_names() {
        let author = Author::new("Jane Q Doe");
        assert_eq!(author.last_first(), "Doe, Jane Q");
    }

    #[test]
    fn test_last_first_single_token() {
        let author = Author::new("Plato");
        assert_eq!(author.last_first(), "Plato");
    }

    #[test]
    fn test_last_first_extra_whitespace() {
        let author = Author::new("  Wei   Li ");
        assert_eq!(author.last_first(), "Li, Wei");
    }

    #[test]
    fn test_family_name() {
        assert_eq!(Author::new("Jane Q Doe").family_name(), "Doe");
        assert_eq!(Author::new("Plato").family_name(), "Plato");
        assert_eq!(Author::new("  ").family_name(), "");
    }

    #[test]
    fn test_author_field_joins_with_and() {
        assert_eq!(sample_record().author_field(), "Doe, Jane Q and Li, Wei");
    }

    #[test]
    fn test_author_names_keep_order() {
        assert_eq!(sample_record().author_names(), "Jane Q Doe, Wei Li");
    }

    #[test]
    fn test_is_preprint_case_insensitive() {
        let mut record = sample_record();
        assert!(record.is_preprint());
        record.venue = "ARXIV".to_string();
        assert!(record.is_preprint());
        record.venue = "CVPR".to_string();
        assert!(!record.is_preprint());
    }
}
