//! Ingestion of OCR dump files produced by the external OCR stage.
//!
//! Each detection is persisted as one line of the form
//! `OCR='<text>', score=<f>, bbox=[x0,y0,x1,y1]`. Lines that do not
//! match the format are skipped.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::extract::rules::patterns::DETECTION_LINE;
use crate::layout::Token;

/// Parse OCR dump text into tokens, skipping non-matching lines.
pub fn parse_dump(input: &str) -> Vec<Token> {
    input.lines().filter_map(parse_detection).collect()
}

/// Read and parse an OCR dump file.
pub fn read_dump(path: &Path) -> Result<Vec<Token>> {
    let contents = fs::read_to_string(path)?;
    let tokens = parse_dump(&contents);

    if tokens.is_empty() {
        warn!(path = %path.display(), "no detections found in dump");
    } else {
        debug!(path = %path.display(), tokens = tokens.len(), "dump parsed");
    }

    Ok(tokens)
}

fn parse_detection(line: &str) -> Option<Token> {
    let caps = DETECTION_LINE.captures(line)?;

    let text = caps[1].trim().to_string();
    let score: f32 = caps[2].parse().ok()?;
    let bbox = [
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
    ];

    Some(Token::new(text, score, bbox))
}
