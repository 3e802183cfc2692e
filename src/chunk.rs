//! Page-bounded, paragraph-boundary passage splitter.
//!
//! Splits a document's pages into [`Passage`]s that respect a configurable
//! `max_tokens` limit. Passages never cross a page boundary, and splitting
//! happens on paragraph boundaries (`\n\n`) whenever possible so each
//! passage stays semantically coherent.
//!
//! # Algorithm
//!
//! 1. Convert `max_tokens` and `overlap_tokens` to characters using a
//!    4 chars/token ratio.
//! 2. For each page, split on `\n\n` and accumulate paragraphs into a
//!    buffer until adding the next one would exceed `max_chars`.
//! 3. When exceeded, flush the buffer as a passage and start a new one.
//! 4. A single paragraph longer than `max_chars` is hard-split at the last
//!    newline or space before the limit; consecutive pieces overlap by
//!    `overlap_chars`.
//! 5. Blank pages produce no passages.
//!
//! The output depends only on the input text and the two limits, so the
//! same document always yields the same passage sequence.
//!
//! # Example
//!
//! ```rust
//! use hr_policy_agent::chunk::chunk_pages;
//!
//! let pages = vec!["Remote work.\n\nVacation days.".to_string()];
//! let passages = chunk_pages(&pages, 1000, 50);
//! assert_eq!(passages.len(), 1);
//! assert_eq!(passages[0].page, 1);
//! ```

use sha2::{Digest, Sha256};

use crate::models::Passage;

/// Approximate chars-per-token ratio.
const CHARS_PER_TOKEN: usize = 4;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split pages into passages with contiguous indices starting at 0.
pub fn chunk_pages(pages: &[String], max_tokens: usize, overlap_tokens: usize) -> Vec<Passage> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;
    let overlap_chars = (overlap_tokens * CHARS_PER_TOKEN).min(max_chars - 1);

    let mut passages = Vec::new();
    for (page_idx, page) in pages.iter().enumerate() {
        for (offset, text) in chunk_page(page, max_chars, overlap_chars) {
            passages.push(make_passage(passages.len(), page_idx + 1, offset, &text));
        }
    }
    passages
}

/// Chunk a single page, returning `(byte offset, text)` pairs.
fn chunk_page(page: &str, max_chars: usize, overlap_chars: usize) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current_buf = String::new();
    let mut buf_offset = 0usize;
    let mut cursor = 0usize;

    for para in page.split(PARAGRAPH_BREAK) {
        let para_start = cursor;
        cursor += para.len() + PARAGRAPH_BREAK.len();

        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }
        let trimmed_offset = para_start + (para.len() - para.trim_start().len());

        // If adding this paragraph would exceed max, flush current buffer
        let would_be = if current_buf.is_empty() {
            trimmed.len()
        } else {
            current_buf.len() + PARAGRAPH_BREAK.len() + trimmed.len()
        };

        if would_be > max_chars && !current_buf.is_empty() {
            out.push((buf_offset, std::mem::take(&mut current_buf)));
        }

        if trimmed.len() > max_chars {
            split_oversized(trimmed, trimmed_offset, max_chars, overlap_chars, &mut out);
        } else {
            if current_buf.is_empty() {
                buf_offset = trimmed_offset;
            } else {
                current_buf.push_str(PARAGRAPH_BREAK);
            }
            current_buf.push_str(trimmed);
        }
    }

    if !current_buf.is_empty() {
        out.push((buf_offset, current_buf));
    }

    out
}

/// Hard-split a paragraph longer than `max_chars`.
fn split_oversized(
    text: &str,
    base_offset: usize,
    max_chars: usize,
    overlap_chars: usize,
    out: &mut Vec<(usize, String)>,
) {
    let mut start = 0usize;
    while start < text.len() {
        let limit = floor_char_boundary(text, (start + max_chars).min(text.len()));
        let mut end = limit;
        if end < text.len() {
            // Prefer a newline or space boundary
            if let Some(pos) = text[start..end].rfind(|c: char| c == '\n' || c == ' ') {
                if pos > 0 {
                    end = start + pos + 1;
                }
            }
        }
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }

        let piece = &text[start..end];
        let lead = piece.len() - piece.trim_start().len();
        let piece = piece.trim();
        if !piece.is_empty() {
            out.push((base_offset + start + lead, piece.to_string()));
        }

        if end >= text.len() {
            break;
        }
        let next = floor_char_boundary(text, end.saturating_sub(overlap_chars));
        start = if next > start { next } else { end };
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(text.len())
}

fn make_passage(index: usize, page: usize, offset: usize, text: &str) -> Passage {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Passage {
        index,
        page,
        offset,
        text: text.to_string(),
        hash,
    }
}
