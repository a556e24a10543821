//! Reading-order reconstruction from unordered OCR detections.
//!
//! Groups text boxes into top-to-bottom lines and sorts each line
//! left-to-right, robust to the vertical jitter of OCR bounding boxes.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single OCR detection: text span, confidence and bounding box.
///
/// Produced by the external OCR stage; read-only to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub score: f32,

    /// Bounding box in pixel coordinates (x0, y0, x1, y1).
    pub bbox: [i32; 4],
}

impl Token {
    /// Create a new token.
    pub fn new(text: impl Into<String>, score: f32, bbox: [i32; 4]) -> Self {
        Self {
            text: text.into(),
            score,
            bbox,
        }
    }

    /// Left edge of the bounding box.
    pub fn left(&self) -> i32 {
        self.bbox[0]
    }

    /// Top edge of the bounding box.
    pub fn top(&self) -> i32 {
        self.bbox[1]
    }

    /// Right edge of the bounding box.
    pub fn right(&self) -> i32 {
        self.bbox[2]
    }

    /// Height of the bounding box.
    pub fn height(&self) -> i32 {
        (self.bbox[3] - self.bbox[1]).abs()
    }
}

/// An ordered sequence of tokens sharing one inferred text row.
pub type Line = Vec<Token>;

/// Groups unordered tokens into reading-order lines.
///
/// The grouping tolerance adapts to the detected text height instead of
/// using a fixed pixel threshold, so receipts of any resolution or font
/// size cluster the same way.
#[derive(Debug, Clone)]
pub struct LineReconstructor {
    /// Vertical tolerance as a fraction of the minimum token height.
    eps_scale: f32,
}

impl LineReconstructor {
    /// Create a reconstructor with the conservative default tolerance.
    pub fn new() -> Self {
        // 0.8 x the smallest height keeps two genuinely distinct rows
        // that sit close together from merging.
        Self { eps_scale: 0.8 }
    }

    /// Set the tolerance scale applied to the minimum token height.
    pub fn with_eps_scale(mut self, scale: f32) -> Self {
        self.eps_scale = scale;
        self
    }

    /// Group tokens into ordered lines matching human reading order.
    ///
    /// Purely geometric; token text is never inspected.
    pub fn reconstruct(&self, mut tokens: Vec<Token>) -> Vec<Line> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let h_min = tokens
            .iter()
            .map(|t| t.height() as f32)
            .fold(f32::INFINITY, f32::min);
        let eps = h_min * self.eps_scale;

        debug!(h_min, eps, tokens = tokens.len(), "clustering token rows");

        // Stable sort by (y, x) so ties in y resolve by x only.
        tokens.sort_by(|a, b| a.top().cmp(&b.top()).then(a.left().cmp(&b.left())));

        // Density clustering over top-y with minimum cluster size 1:
        // consecutive tokens chain into one row while the gap stays
        // within eps, and every outlier forms its own singleton row.
        let mut lines: Vec<Line> = Vec::new();
        let mut current: Line = Vec::new();
        let mut last_y: Option<i32> = None;

        for token in tokens {
            if let Some(y) = last_y {
                if (token.top() - y) as f32 > eps {
                    lines.push(std::mem::take(&mut current));
                }
            }
            last_y = Some(token.top());
            current.push(token);
        }
        if !current.is_empty() {
            lines.push(current);
        }

        // Left-to-right within each row. Clusters come out ordered by
        // minimum y already, courtesy of the sorted sweep.
        for line in &mut lines {
            line.sort_by_key(Token::left);
        }

        let lines = self.merge_split_rows(lines, h_min);

        debug!(lines = lines.len(), "reconstructed reading order");
        lines
    }

    /// Re-join adjacent row clusters that are two halves of one
    /// physical row, split by the clustering step.
    ///
    /// Merges only when the rows sit closer than the minimum token
    /// height AND their horizontal spans do not overlap; overlapping
    /// spans mean two genuinely stacked rows.
    fn merge_split_rows(&self, lines: Vec<Line>, h_min: f32) -> Vec<Line> {
        let mut merged: Vec<Line> = Vec::new();

        for line in lines {
            if let Some(prev) = merged.last_mut() {
                let close = (mean_top(&line) - mean_top(prev)).abs() < h_min;
                if close && !spans_overlap(prev, &line) {
                    prev.extend(line);
                    prev.sort_by_key(Token::left);
                    continue;
                }
            }
            merged.push(line);
        }

        merged
    }
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_top(line: &Line) -> f32 {
    line.iter().map(|t| t.top() as f32).sum::<f32>() / line.len() as f32
}

fn spans_overlap(a: &Line, b: &Line) -> bool {
    let a_min = a.iter().map(Token::left).min().unwrap_or(0);
    let a_max = a.iter().map(Token::right).max().unwrap_or(0);
    let b_min = b.iter().map(Token::left).min().unwrap_or(0);
    let b_max = b.iter().map(Token::right).max().unwrap_or(0);

    !(a_max < b_min || b_max < a_min)
}
