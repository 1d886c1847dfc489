//! Shared test constants and helpers for integration tests.

/// A preprint record with a linked author and two links.
pub const PREPRINT_RECORD: &str = "**Neural-Radiance Fields: A Survey.**<br>
*[Jane Q Doe](https://doe.dev), Wei Li.*<br>
arXiv 2021. [[PDF](https://arxiv.org/abs/2103.11536)] [[Project](https://nerf.io)]";

/// A conference record whose links continue on a fourth line.
pub const CONFERENCE_RECORD: &str = "**StyleGAN: A Style-Based Generator.**<br>
*Tero Karras, Samuli Laine, Timo Aila.*<br>
CVPR 2019. [[PDF](https://arxiv.org/abs/1812.04948)]
[[Code](https://github.com/NVlabs/stylegan)]";

/// Metadata for the preprint, announcing its acceptance at CVPR.
pub const PREPRINT_METADATA: &str = r#"{"id": "2103.11536v2", "title": "neural radiance fields: a survey", "authors": ["Jane Q Doe", "Wei Li"], "comment": "Accepted to CVPR 2021. Project: https://nerf.io", "year": "2021"}"#;

/// Build a reading list from record blocks.
pub fn build_document(records: &[&str]) -> String {
    let mut doc = records.join("\n\n");
    doc.push('\n');
    doc
}
