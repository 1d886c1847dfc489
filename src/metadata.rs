//! Paper metadata providers and the record update workflow.
//!
//! Fetching metadata is delegated to a [`MetadataProvider`]. This crate
//! ships two offline providers: a JSON/JSONL store and a directory of saved
//! arXiv API responses. Anything that talks to the network implements the
//! same trait outside this crate.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::markdown::clean_title;
use crate::record::{Author, LineEndings, PaperRecord};
use crate::venues::{resolve_publication, split_publication};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"v\d+$").unwrap());
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>()\[\]]+").unwrap());

/// Errors that can occur when fetching metadata.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No metadata found for '{0}'")]
    NotFound(String),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSONL at line {line}: {message}")]
    JsonlError { line: usize, message: String },

    #[error("Metadata must be a JSON array")]
    NotAnArray,

    #[error("Malformed metadata for '{id}': {message}")]
    Malformed { id: String, message: String },

    #[error("Metadata provider failed: {0}")]
    Transport(String),
}

/// Metadata for one paper, as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    /// Paper identifier, possibly with a version suffix (e.g., "2103.11536v2")
    pub id: String,
    pub title: String,
    /// Author names in "First Last" order
    pub authors: Vec<String>,
    /// Free-text comment, where the accepted venue is usually announced
    #[serde(default)]
    pub comment: Option<String>,
    /// Four-digit year of first publication, when known
    #[serde(default)]
    pub year: Option<String>,
}

/// Source of paper metadata.
///
/// Calls are synchronous. Retries and timeouts, if any, are the
/// implementation's business.
pub trait MetadataProvider {
    fn fetch(&self, id: &str) -> Result<Metadata, FetchError>;
}

/// Strips a trailing version suffix: "2103.11536v2" becomes "2103.11536".
pub fn normalize_id(id: &str) -> &str {
    let id = id.trim();
    match VERSION_RE.find(id) {
        Some(m) => &id[..m.start()],
        None => id,
    }
}

// ---------------------------------------------------------------------------
// MetadataStore
// ---------------------------------------------------------------------------

/// In-memory provider backed by a JSON array or JSONL file.
#[derive(Debug, Default)]
pub struct MetadataStore {
    entries: HashMap<String, Metadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a JSON or JSONL file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self, FetchError> {
        let content = fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), entries = store.len(), "loaded metadata store");
        Ok(store)
    }

    /// Builds a store from JSON text.
    ///
    /// Supports two input formats:
    /// - JSON array: `[{"id": "2103.11536", ...}, {"id": "2201.00001", ...}]`
    /// - JSONL: one object per line, blank lines ignored
    pub fn from_json(content: &str) -> Result<Self, FetchError> {
        let trimmed = content.trim();
        let mut store = Self::new();

        if trimmed.is_empty() {
            return Ok(store);
        }

        if trimmed.starts_with('[') {
            let value: serde_json::Value = serde_json::from_str(trimmed)?;
            if !value.is_array() {
                return Err(FetchError::NotAnArray);
            }
            let entries: Vec<Metadata> = serde_json::from_value(value)?;
            for entry in entries {
                store.insert(entry);
            }
            return Ok(store);
        }

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Metadata>(line) {
                Ok(entry) => store.insert(entry),
                Err(e) => {
                    return Err(FetchError::JsonlError {
                        line: line_num + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(store)
    }

    /// Adds an entry, keyed by its id without version suffix.
    pub fn insert(&mut self, metadata: Metadata) {
        self.entries
            .insert(normalize_id(&metadata.id).to_string(), metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataProvider for MetadataStore {
    fn fetch(&self, id: &str) -> Result<Metadata, FetchError> {
        self.entries
            .get(normalize_id(id))
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AtomDirectory
// ---------------------------------------------------------------------------

/// Provider reading saved arXiv API responses from `<dir>/<id>.xml`.
#[derive(Debug, Clone)]
pub struct AtomDirectory {
    dir: PathBuf,
}

impl AtomDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MetadataProvider for AtomDirectory {
    fn fetch(&self, id: &str) -> Result<Metadata, FetchError> {
        let id = normalize_id(id);
        let path = self.dir.join(format!("{}.xml", id));
        if !path.exists() {
            return Err(FetchError::NotFound(id.to_string()));
        }

        let xml = fs::read_to_string(&path)?;
        parse_atom_entry(&xml).map_err(|message| FetchError::Malformed {
            id: id.to_string(),
            message,
        })
    }
}

/// Parses the first entry of an arXiv API Atom response.
///
/// Reads the entry's `<id>`, `<title>`, `<author><name>`, `<published>`
/// and `<arxiv:comment>` elements. Character references are decoded.
///
/// # Errors
///
/// Returns a description of the XML error, or of the first required
/// element that is missing.
pub fn parse_atom_entry(xml: &str) -> Result<Metadata, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut found_entry = false;
    let mut in_entry = false;
    let mut in_author = false;
    let mut current_element = String::new();
    let mut entry_id = String::new();
    let mut entry_title = String::new();
    let mut entry_published = String::new();
    let mut entry_comment = String::new();
    let mut entry_authors: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "entry" {
                    found_entry = true;
                    in_entry = true;
                } else if name == "author" {
                    in_author = true;
                }
                current_element = name;
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    // Only the first entry is read
                    b"entry" => break,
                    b"author" => in_author = false,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) if in_entry => {
                let text = e
                    .unescape()
                    .map_err(|e| format!("XML parse error: {}", e))?;
                match current_element.as_str() {
                    "id" => entry_id.push_str(&text),
                    "title" => entry_title.push_str(&text),
                    "published" => entry_published.push_str(&text),
                    "arxiv:comment" => entry_comment.push_str(&text),
                    "name" if in_author => entry_authors.push(text.trim().to_string()),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    if !found_entry {
        return Err("missing <entry> element".to_string());
    }

    let id = entry_id
        .trim()
        .rsplit_once("/abs/")
        .map(|(_, id)| normalize_id(id).to_string())
        .filter(|id| !id.is_empty())
        .ok_or("missing arXiv <id> element")?;

    let title = entry_title.trim().to_string();
    if title.is_empty() {
        return Err("missing <title> element".to_string());
    }

    let year = entry_published
        .get(..4)
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string);

    let comment = Some(entry_comment.trim().to_string()).filter(|c| !c.is_empty());

    Ok(Metadata {
        id,
        title,
        authors: entry_authors,
        comment,
        year,
    })
}

/// Extracts `http(s)` URLs from free text, trimming trailing punctuation.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']).to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Record workflows
// ---------------------------------------------------------------------------

/// Refreshes a record from freshly fetched metadata.
///
/// The title is replaced by the cleaned metadata title and the author list
/// by the metadata authors. Venue and year are only replaced while the
/// record is still an arXiv preprint, using the venue resolved from the
/// metadata comment. Each field is replaced as a whole; identifier and
/// links are kept.
pub fn update_record(record: &PaperRecord, metadata: &Metadata, venues: &[String]) -> PaperRecord {
    let mut updated = record.clone();

    let title = clean_title(&metadata.title);
    if title.is_empty() {
        tracing::warn!(id = %record.identifier, "metadata has no title, keeping the current one");
    } else {
        updated.title = title;
    }

    let authors: Vec<Author> = metadata
        .authors
        .iter()
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|name| !name.is_empty())
        .map(Author::new)
        .collect();
    if authors.is_empty() {
        tracing::warn!(id = %record.identifier, "metadata has no authors, keeping the current ones");
    } else {
        updated.authors = authors;
    }

    if record.is_preprint() {
        let publication = resolve_publication(metadata.comment.as_deref(), venues, &record.year);
        if let Some((venue, year)) = split_publication(&publication) {
            if venue != record.venue || year != record.year {
                tracing::info!(id = %record.identifier, publication = %publication, "updated publication");
            }
            updated.venue = venue;
            updated.year = year;
        }
    }

    updated
}

/// Fetches metadata for a record and applies [`update_record`].
pub fn refresh_record(
    record: &PaperRecord,
    provider: &dyn MetadataProvider,
    venues: &[String],
) -> Result<PaperRecord, FetchError> {
    let metadata = provider.fetch(&record.identifier)?;
    Ok(update_record(record, &metadata, venues))
}

/// Builds a new reading-list record from metadata.
///
/// The first link points at the arXiv abstract page; every URL mentioned in
/// the comment follows as a `[[Link](url)]`.
///
/// # Errors
///
/// Returns `FetchError::Malformed` when the metadata has no usable id, year,
/// title or authors.
pub fn record_from_metadata(
    metadata: &Metadata,
    venues: &[String],
) -> Result<PaperRecord, FetchError> {
    let id = normalize_id(&metadata.id);
    let malformed = |message: &str| FetchError::Malformed {
        id: metadata.id.clone(),
        message: message.to_string(),
    };

    if !IDENTIFIER_RE.is_match(id) {
        return Err(malformed("identifier is not of the form digits.digits"));
    }
    let year = metadata
        .year
        .as_deref()
        .ok_or_else(|| malformed("publication year is missing"))?;

    let mut links = vec![format!("[[PDF](https://arxiv.org/abs/{})]", id)];
    if let Some(comment) = &metadata.comment {
        links.extend(
            extract_urls(comment)
                .into_iter()
                .map(|url| format!("[[Link]({})]", url)),
        );
    }

    let stub = PaperRecord {
        title: String::new(),
        authors: Vec::new(),
        venue: "arXiv".to_string(),
        year: year.to_string(),
        identifier: id.to_string(),
        links,
        endings: LineEndings::default(),
    };
    let record = update_record(&stub, metadata, venues);

    if record.title.is_empty() {
        return Err(malformed("title is missing"));
    }
    if record.authors.is_empty() {
        return Err(malformed("author list is empty"));
    }
    Ok(record)
}
