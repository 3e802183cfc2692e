//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REMOTE: &str = "Remote work is allowed up to 3 days per week.";
pub const VACATION: &str = "Employees receive 20 vacation days annually.";

/// The two-passage policy: one paragraph each, split by a blank line.
pub fn two_passage_policy() -> String {
    format!("{}\n\n{}", REMOTE, VACATION)
}

/// Write a config that uses the hash embedder and small chunks so each
/// paragraph of the test policy becomes its own passage.
pub fn write_config(root: &Path, document: &str, fail_on_ingestion_error: bool) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let content = format!(
        r#"[document]
path = "{}"

[chunking]
max_tokens = 12
overlap_tokens = 0

[retrieval]
k = 3
fail_on_ingestion_error = {}

[embedding]
provider = "hash"
dims = 512

[server]
bind = "127.0.0.1:0"
"#,
        document, fail_on_ingestion_error
    );

    let path = config_dir.join("hr-policy.toml");
    fs::write(&path, content).unwrap();
    path
}

/// A temp dir holding `policy.txt` and a config pointing at it
/// (relative to the config directory).
pub fn setup_text_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("policy.txt"), two_passage_policy()).unwrap();
    let config = write_config(tmp.path(), "../policy.txt", true);
    (tmp, config)
}

/// Minimal PDF with one Helvetica text line per page.
///
/// Stream lengths and xref offsets are computed, so any ASCII phrase
/// without parentheses or backslashes works.
pub fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let n = pages.len();
    let font_id = 3 + 2 * n;
    let mut offsets = Vec::new();
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    offsets.push(out.len());
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");

    let kids = (0..n)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");
    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "2 0 obj << /Type /Pages /Kids [{}] /Count {} >> endobj\n",
            kids, n
        )
        .as_bytes(),
    );

    for (i, phrase) in pages.iter().enumerate() {
        let page_id = 3 + 2 * i;
        let content_id = page_id + 1;

        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{} 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 {} 0 R >> >> >> endobj\n",
                page_id, content_id, font_id
            )
            .as_bytes(),
        );

        let stream = format!("BT /F1 12 Tf 72 700 Td ({}) Tj ET", phrase);
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{} 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
                content_id,
                stream.len(),
                stream
            )
            .as_bytes(),
        );
    }

    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "{} 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
            font_id
        )
        .as_bytes(),
    );

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for off in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}
