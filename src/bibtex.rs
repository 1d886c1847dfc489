//! BibTeX and BBL rendering for parsed paper records.

use std::fmt;

use crate::record::PaperRecord;

/// Venues rendered as journal articles rather than conference papers.
pub const JOURNALS: &[&str] = &["TPAMI", "TIP", "TOG"];

/// BibTeX entry type of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Article,
    InProceedings,
}

impl EntryType {
    /// Picks the entry type from a venue token.
    ///
    /// arXiv (any casing) and the venues in [`JOURNALS`] are articles;
    /// everything else is treated as a conference paper.
    pub fn for_venue(venue: &str) -> Self {
        if venue.eq_ignore_ascii_case("arxiv") || JOURNALS.contains(&venue) {
            EntryType::Article
        } else {
            EntryType::InProceedings
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Article => "article",
            EntryType::InProceedings => "inproceedings",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the citation key for a record.
///
/// The key is the first author's family name, the year, and the first word
/// of the title cut at the first `-` or `:`, all lower-cased. The same
/// record always yields the same key, so BibTeX and BBL output agree.
///
/// The family name is the last token of the first author's name, which is
/// what precedes the first comma of the author field for every multi-token
/// name. A single-token first author gives just that token.
///
/// ```
/// use paperlist_tools::{citation_key, Author, LineEndings, PaperRecord};
///
/// let record = PaperRecord {
///     title: "Neural-Radiance Fields: A Survey".to_string(),
///     authors: vec![Author::new("Jane Q Doe"), Author::new("Wei Li")],
///     venue: "arXiv".to_string(),
///     year: "2021".to_string(),
///     identifier: "2103.11536".to_string(),
///     links: vec![],
///     endings: LineEndings::default(),
/// };
/// assert_eq!(citation_key(&record), "doe2021neural");
/// ```
pub fn citation_key(record: &PaperRecord) -> String {
    let family = record
        .authors
        .first()
        .map(|author| author.family_name())
        .unwrap_or_default();

    format!(
        "{}{}{}",
        family.to_lowercase(),
        record.year,
        title_stem(&record.title)
    )
}

/// First word of the title, cut at the first `-` and then the first `:`.
fn title_stem(title: &str) -> String {
    let first_word = title.split_whitespace().next().unwrap_or_default();
    let stem = first_word.split('-').next().unwrap_or_default();
    let stem = stem.split(':').next().unwrap_or_default();
    stem.to_lowercase()
}

/// Renders one record as a BibTeX entry.
///
/// Fields are always emitted in the order title, author, venue field, year.
/// The venue field is `journal` with the arXiv identifier for preprints and
/// `booktitle` for everything else, journals included.
pub fn render_bibtex(record: &PaperRecord) -> String {
    let entry_type = EntryType::for_venue(&record.venue);

    let mut bib = format!("@{}{{{},\n", entry_type, citation_key(record));
    bib.push_str(&format!("  title={{{}}},\n", record.title));
    bib.push_str(&format!("  author={{{}}},\n", record.author_field()));
    if record.is_preprint() {
        bib.push_str(&format!(
            "  journal={{arXiv preprint: arXiv {}}},\n",
            record.identifier
        ));
    } else {
        bib.push_str(&format!("  booktitle={{{}}},\n", record.venue));
    }
    bib.push_str(&format!("  year={{{}}}\n", record.year));
    bib.push('}');
    bib
}

/// Renders every record as BibTeX, one entry per line group, in input order.
pub fn render_bibliography(records: &[PaperRecord]) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&render_bibtex(record));
        output.push('\n');
    }
    output
}

/// Renders one record as a `\bibitem` block.
pub fn render_bibitem(record: &PaperRecord) -> String {
    format!(
        "\\bibitem{{{}}}\n{}\n{}\n{}, {}",
        citation_key(record),
        record.title,
        record.author_names(),
        record.venue,
        record.year
    )
}

/// Renders records as a bibliography list, blocks separated by a blank line.
pub fn render_bbl(records: &[PaperRecord]) -> String {
    records
        .iter()
        .map(render_bibitem)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Author, LineEndings};

    fn record(venue: &str) -> PaperRecord {
        PaperRecord {
            title: "Neural-Radiance Fields: A Survey".to_string(),
            authors: vec![Author::new("Jane Q Doe"), Author::new("Wei Li")],
            venue: venue.to_string(),
            year: "2021".to_string(),
            identifier: "2103.11536".to_string(),
            links: vec!["[[PDF](https://arxiv.org/abs/2103.11536)]".to_string()],
            endings: LineEndings::default(),
        }
    }

    // ============================================
    // Tests for citation_key()
    // ============================================

    #[test]
    fn test_citation_key_basic() {
        assert_eq!(citation_key(&record("arXiv")), "doe2021neural");
    }

    #[test]
    fn test_citation_key_colon_stem() {
        // Given: A title whose first word ends in a colon
        let mut r = record("CVPR");
        r.title = "StyleGAN: Better Generators".to_string();

        // Then: The colon is cut and the stem lower-cased
        assert_eq!(citation_key(&r), "doe2021stylegan");
    }

    #[test]
    fn test_citation_key_single_name_author() {
        let mut r = record("CVPR");
        r.authors = vec![Author::new("Plato")];
        assert_eq!(citation_key(&r), "plato2021neural");
    }

    #[test]
    fn test_citation_key_single_name_author_with_coauthors() {
        // Given: A single-token first author followed by a co-author
        let mut r = record("CVPR");
        r.authors = vec![Author::new("Plato"), Author::new("Wei Li")];

        // Then: Only the first author's name goes into the key
        assert_eq!(citation_key(&r), "plato2021neural");
    }

    #[test]
    fn test_citation_key_deterministic() {
        let r = record("CVPR");
        assert_eq!(citation_key(&r), citation_key(&r.clone()));
    }

    // ============================================
    // Tests for EntryType
    // ============================================

    #[test]
    fn test_entry_type_arxiv_any_case() {
        assert_eq!(EntryType::for_venue("arXiv"), EntryType::Article);
        assert_eq!(EntryType::for_venue("ARXIV"), EntryType::Article);
    }

    #[test]
    fn test_entry_type_journal_allow_list() {
        assert_eq!(EntryType::for_venue("TPAMI"), EntryType::Article);
        assert_eq!(EntryType::for_venue("TOG"), EntryType::Article);
        // Allow-list membership is case-sensitive
        assert_eq!(EntryType::for_venue("tpami"), EntryType::InProceedings);
    }

    #[test]
    fn test_entry_type_conference() {
        assert_eq!(EntryType::for_venue("CVPR"), EntryType::InProceedings);
        assert_eq!(EntryType::InProceedings.to_string(), "inproceedings");
    }

    // ============================================
    // Tests for render_bibtex()
    // ============================================

    #[test]
    fn test_render_bibtex_arxiv() {
        let bib = render_bibtex(&record("arXiv"));
        assert_eq!(
            bib,
            concat!(
                "@article{doe2021neural,\n",
                "  title={Neural-Radiance Fields: A Survey},\n",
                "  author={Doe, Jane Q and Li, Wei},\n",
                "  journal={arXiv preprint: arXiv 2103.11536},\n",
                "  year={2021}\n",
                "}"
            )
        );
    }

    #[test]
    fn test_render_bibtex_conference() {
        let bib = render_bibtex(&record("CVPR"));
        assert!(bib.starts_with("@inproceedings{doe2021neural,\n"));
        assert!(bib.contains("  booktitle={CVPR},\n"));
        assert!(!bib.contains("journal="));
    }

    #[test]
    fn test_render_bibtex_journal() {
        // Given: A record from an allow-listed journal
        let bib = render_bibtex(&record("TPAMI"));

        // Then: It is an article, but the venue still goes in booktitle
        assert!(bib.starts_with("@article{"));
        assert!(bib.contains("  booktitle={TPAMI},\n"));
        assert!(!bib.contains("journal="));
    }

    #[test]
    fn test_render_bibtex_field_order() {
        let bib = render_bibtex(&record("CVPR"));
        let title = bib.find("title=").unwrap();
        let author = bib.find("author=").unwrap();
        let venue = bib.find("booktitle=").unwrap();
        let year = bib.find("year=").unwrap();
        assert!(title < author && author < venue && venue < year);
    }

    #[test]
    fn test_render_bibliography_one_entry_per_record() {
        let output = render_bibliography(&[record("arXiv"), record("CVPR")]);
        assert_eq!(output.matches('@').count(), 2);
        assert!(output.ends_with("}\n"));
        assert!(output.find("@article").unwrap() < output.find("@inproceedings").unwrap());
    }

    // ============================================
    // Tests for render_bbl()
    // ============================================

    #[test]
    fn test_render_bibitem() {
        assert_eq!(
            render_bibitem(&record("CVPR")),
            "\\bibitem{doe2021neural}\nNeural-Radiance Fields: A Survey\nJane Q Doe, Wei Li\nCVPR, 2021"
        );
    }

    #[test]
    fn test_render_bbl_blank_line_between_blocks() {
        let mut second = record("ECCV");
        second.year = "2022".to_string();
        let bbl = render_bbl(&[record("CVPR"), second]);
        let blocks: Vec<&str> = bbl.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("\\bibitem{doe2021neural}"));
        assert!(blocks[1].starts_with("\\bibitem{doe2022neural}"));
    }

    #[test]
    fn test_render_bbl_empty() {
        assert_eq!(render_bbl(&[]), "");
    }

    #[test]
    fn test_bibtex_and_bbl_share_key() {
        let r = record("CVPR");
        let key = citation_key(&r);
        assert!(render_bibtex(&r).contains(&format!("{{{},", key)));
        assert!(render_bibitem(&r).contains(&format!("\\bibitem{{{}}}", key)));
    }
}
