//! paperlist-tools: turn a Markdown reading list into bibliography entries.
//!
//! This library provides functionality to:
//! - Parse paper records from a Markdown reading list
//! - Clean titles and convert author names
//! - Render records as BibTeX or `\bibitem` lists
//! - Refresh records from paper metadata and resolve publication venues

pub mod bibtex;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod record;
pub mod venues;

pub use bibtex::{
    citation_key, render_bbl, render_bibitem, render_bibliography, render_bibtex, EntryType,
};
pub use markdown::{
    clean_title, convert_author_names, parse_document, parse_document_all, parse_record,
    render_authors_line, render_document, render_record, render_title_line, split_document,
    strip_author_links, DocumentError, ParseError,
};
pub use metadata::{
    record_from_metadata, refresh_record, update_record, AtomDirectory, FetchError, Metadata,
    MetadataProvider, MetadataStore,
};
pub use output::generate_output;
pub use record::{Author, LineEndings, PaperRecord};
pub use venues::{builtin_venues, load_venues, resolve_publication, split_publication};
