//! Markdown reading-list parser.
//!
//! Each paper in the list is a block of at least three lines, and blocks are
//! separated by a blank line:
//!
//! ```text
//! **Here is the Paper Name.**<br>
//! *[Author 1](homepage), Author 2, Author 3.*<br>
//! CVPR 2021. [[PDF](https://arxiv.org/abs/2103.11536)] [[Project](link)]
//! ```
//!
//! The module also holds the text utilities shared by the other workflows:
//! title cleaning, author link stripping, and "Last, First" conversion.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::record::{Author, LineEndings, PaperRecord};

/// Words that stay lower-case when cleaning a title.
pub const PREPOSITIONS: &[&str] = &[
    "about", "and", "as", "at", "but", "by", "for", "from", "in", "nor", "of", "on", "or", "to",
    "with",
];

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\.\*\*<br>").unwrap());
static AUTHORS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\.\*<br>").unwrap());
static AUTHOR_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static LINKED_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]\(([^)]+)\)(.*)$").unwrap());
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Errors that can occur while parsing a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed record: expected at least 3 lines, found {lines}")]
    MalformedDocument { lines: usize },

    #[error("Could not extract {field} from line {line}")]
    FieldExtractionError { field: &'static str, line: usize },

    #[error("No numeric identifier found in the record links")]
    IdentifierNotFound,
}

/// A parse error tagged with the 0-based position of the failing record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record {index}: {source}")]
pub struct DocumentError {
    pub index: usize,
    #[source]
    pub source: ParseError,
}

/// Splits a document into raw record blocks.
///
/// The document is trimmed first, then split on blank lines (`"\n\n"`).
/// Blocks that are empty after trimming are skipped, so extra blank lines
/// between records do not produce phantom records.
pub fn split_document(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect()
}

/// Parses every record in the document, stopping at the first failure.
///
/// # Errors
///
/// Returns a `DocumentError` carrying the index of the first record that
/// failed to parse.
///
/// # Examples
///
/// ```
/// use paperlist_tools::parse_document;
///
/// let doc = "**Neural Fields.**<br>\n*Jane Doe.*<br>\narXiv 2021. [[PDF](https://arxiv.org/abs/2103.11536)]";
/// let records = parse_document(doc).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].identifier, "2103.11536");
/// ```
pub fn parse_document(text: &str) -> Result<Vec<PaperRecord>, DocumentError> {
    let records = split_document(text)
        .into_iter()
        .enumerate()
        .map(|(index, block)| parse_record(block).map_err(|source| DocumentError { index, source }))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(records = records.len(), "parsed document");
    Ok(records)
}

/// Parses every record in the document, keeping one result per block.
///
/// Unlike [`parse_document`], a failing record does not hide its siblings,
/// which lets a caller report every problem in one pass.
pub fn parse_document_all(text: &str) -> Vec<Result<PaperRecord, DocumentError>> {
    split_document(text)
        .into_iter()
        .enumerate()
        .map(|(index, block)| {
            parse_record(block).map_err(|source| {
                tracing::warn!(index, error = %source, "skipping malformed record");
                DocumentError { index, source }
            })
        })
        .collect()
}

/// Parses one record block.
///
/// # Errors
///
/// - `MalformedDocument` when the block has fewer than three lines
/// - `FieldExtractionError` when the title, authors or publication line does
///   not follow the expected layout
/// - `IdentifierNotFound` when the first link carries no `digits.digits` id
pub fn parse_record(block: &str) -> Result<PaperRecord, ParseError> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() < 3 {
        return Err(ParseError::MalformedDocument { lines: lines.len() });
    }

    let (title, title_end) = capture_with_rest(&TITLE_RE, lines[0])
        .map(|(title, rest)| (title.trim(), rest))
        .filter(|(t, _)| !t.is_empty())
        .ok_or(ParseError::FieldExtractionError {
            field: "title",
            line: 1,
        })?;

    let (authors_str, authors_end) = capture_with_rest(&AUTHORS_RE, lines[1])
        .ok_or(ParseError::FieldExtractionError {
            field: "authors",
            line: 2,
        })?;
    let authors = parse_authors(authors_str);
    if authors.is_empty() {
        return Err(ParseError::FieldExtractionError {
            field: "authors",
            line: 2,
        });
    }

    let publication = lines[2..].join(" ");
    let publication_error = ParseError::FieldExtractionError {
        field: "publication",
        line: 3,
    };
    let (venue_and_year, rest) = publication
        .split_once(". ")
        .ok_or_else(|| publication_error.clone())?;
    let (venue, year) = venue_and_year
        .trim()
        .rsplit_once(' ')
        .map(|(v, y)| (v.trim(), y.trim()))
        .filter(|(v, y)| !v.is_empty() && YEAR_RE.is_match(y))
        .ok_or(publication_error)?;

    let links: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    let identifier = links
        .first()
        .and_then(|link| IDENTIFIER_RE.find(link))
        .map(|m| m.as_str().to_string())
        .ok_or(ParseError::IdentifierNotFound)?;

    Ok(PaperRecord {
        title: title.to_string(),
        authors,
        venue: venue.to_string(),
        year: year.to_string(),
        identifier,
        links,
        endings: LineEndings {
            title: title_end.to_string(),
            authors: authors_end.to_string(),
        },
    })
}

/// Returns the first group of `re` in `line` and the text after the match.
fn capture_with_rest<'h>(re: &Regex, line: &'h str) -> Option<(&'h str, &'h str)> {
    let cap = re.captures(line)?;
    let whole = cap.get(0)?;
    let inner = cap.get(1)?;
    Some((inner.as_str(), &line[whole.end()..]))
}

/// Splits an authors string into `Author`s, keeping homepage links.
///
/// An entry that starts with `[Name](url)` keeps the url as homepage and
/// any text after the link as marker; other entries only have their links
/// stripped.
fn parse_authors(raw: &str) -> Vec<Author> {
    split_author_entries(raw)
        .into_iter()
        .map(str::trim)
        .filter_map(|entry| match LINKED_AUTHOR_RE.captures(entry) {
            Some(cap) => Some(Author {
                name: cap.get(1)?.as_str().to_string(),
                homepage: Some(cap.get(2)?.as_str().to_string()),
                marker: cap.get(3).map_or("", |m| m.as_str()).to_string(),
            }),
            None => Some(Author::new(strip_author_links(entry))),
        })
        .filter(|author| !author.name.trim().is_empty())
        .collect()
}

/// Splits on commas outside of `[..]` and `(..)`, so a comma inside a
/// homepage url does not start a new author.
fn split_author_entries(raw: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&raw[start..]);
    entries
}

/// Replaces Markdown links `[Name](url)` with just `Name`.
pub fn strip_author_links(names: &str) -> String {
    AUTHOR_LINK_RE.replace_all(names, "$1").into_owned()
}

/// Converts a comma-separated "First Last" author list into a BibTeX author
/// field.
///
/// ```
/// use paperlist_tools::convert_author_names;
///
/// assert_eq!(
///     convert_author_names("[Jane Q Doe](https://doe.dev), Wei Li"),
///     "Doe, Jane Q and Li, Wei"
/// );
/// ```
pub fn convert_author_names(names: &str) -> String {
    strip_author_links(names)
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Author::new(name).last_first())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Cleans a title for display.
///
/// Whitespace runs (including the line breaks arXiv puts in long titles)
/// collapse to single spaces. Every fully lower-case word that is not a
/// preposition gets its first letter capitalized; words that already
/// contain an upper-case letter, such as "GAN" or "Aadf-GAN", are kept as
/// they are.
pub fn clean_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            if PREPOSITIONS.contains(&word) || !is_lowercase_word(word) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the word has at least one cased letter and none of them is
/// upper-case.
fn is_lowercase_word(word: &str) -> bool {
    word.chars().any(char::is_lowercase) && !word.chars().any(char::is_uppercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders the title line of a record.
pub fn render_title_line(record: &PaperRecord) -> String {
    format!("**{}.**<br>{}", record.title, record.endings.title)
}

/// Renders the authors line of a record, restoring homepage links.
pub fn render_authors_line(record: &PaperRecord) -> String {
    let names: Vec<String> = record
        .authors
        .iter()
        .map(|author| match &author.homepage {
            Some(url) => format!("[{}]({}){}", author.name, url, author.marker),
            None => author.name.clone(),
        })
        .collect();
    format!("*{}.*<br>{}", names.join(", "), record.endings.authors)
}

/// Renders a record back into the three-line Markdown layout.
pub fn render_record(record: &PaperRecord) -> String {
    let mut publication = format!("{} {}.", record.venue, record.year);
    if !record.links.is_empty() {
        publication.push(' ');
        publication.push_str(&record.links.join(" "));
    }

    format!(
        "{}\n{}\n{}",
        render_title_line(record),
        render_authors_line(record),
        publication
    )
}

/// Renders records as a reading-list document, one blank line between
/// records.
pub fn render_document(records: &[PaperRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut output = records
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n\n");
    output.push('\n');
    output
}
