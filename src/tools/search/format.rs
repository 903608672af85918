//! Turns fetched notes into the ordered block sequence returned to the agent.
//!
//! Layout per call:
//! - one summary block echoing the query and the note count
//! - per note: one markdown text block, one resource block per image, one
//!   `---` separator block
//!
//! Rendering is a pure function of its inputs.

use std::fmt::Write as _;

use crate::core::content::OutputBlock;
use crate::domain::Note;

pub const SEPARATOR: &str = "---";

pub fn render(query: &str, notes: &[Note]) -> Vec<OutputBlock> {
    let images: usize = notes.iter().map(|n| n.images.len()).sum();
    let mut blocks = Vec::with_capacity(1 + notes.len() * 2 + images);
    blocks.push(OutputBlock::text(summary(query, notes.len())));

    for (idx, note) in notes.iter().enumerate() {
        blocks.push(OutputBlock::text(note_markdown(idx + 1, note)));
        for (j, url) in note.images.iter().enumerate() {
            blocks.push(OutputBlock::resource(
                url.clone(),
                format!("Image {} for note: {}", j + 1, note.title),
                image_mime_type(url),
            ));
        }
        blocks.push(OutputBlock::text(SEPARATOR));
    }
    blocks
}

pub fn summary(query: &str, found: usize) -> String {
    format!("Results for {query}: found {found} related notes.")
}

fn note_markdown(position: usize, note: &Note) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = write!(md, "## {}. {}\n\n", position, note.title);

    let _ = write!(md, "**Author:** {}", note.author);
    if let Some(desc) = &note.author_desc {
        let _ = write!(md, " ({desc})");
    }
    md.push_str("\n\n");

    if note.has_interactions() {
        let _ = write!(md, "**Interactions:** {}\n\n", interaction_line(note));
    }

    let _ = write!(md, "### Content\n\n{}\n\n", note.content.trim());

    if !note.tags.is_empty() {
        let tags: Vec<String> = note.tags.iter().map(|t| format!("#{t}")).collect();
        let _ = write!(md, "**Tags:** {}\n\n", tags.join(" "));
    }

    let _ = write!(md, "**Original link:** {}", note.link);
    md
}

/// Present metrics only, always in likes/collects/comments order.
fn interaction_line(note: &Note) -> String {
    let parts: Vec<String> = [
        note.likes.map(|n| format!("👍 {n} likes")),
        note.collects.map(|n| format!("⭐ {n} collects")),
        note.comments.map(|n| format!("💬 {n} comments")),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.join(" · ")
}

/// Best-effort MIME type from the URL path extension.
pub fn image_mime_type(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = last.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime.to_string())
}
