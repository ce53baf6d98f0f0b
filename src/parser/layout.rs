//! Layout analysis: grouping positioned spans into lines and blocks.
//!
//! Spans are clustered by baseline into lines, and consecutive lines are
//! split into blocks where the vertical gap, font size or left margin
//! changes noticeably.

use std::cmp::Ordering;

use crate::model::{Line, Span, TextBlock};

/// Baseline variance, as a fraction of the font size, still counted as one line.
const LINE_TOLERANCE: f32 = 0.3;

/// Gap multiple of the average line spacing that starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.5;

/// Font size change (points) that starts a new block.
const BLOCK_SIZE_DELTA: f32 = 1.0;

/// Left margin shift (points) that starts a new block.
const BLOCK_INDENT_DELTA: f32 = 20.0;

/// Group spans into blocks of lines, ordered top to bottom.
pub fn group_into_blocks(spans: Vec<Span>) -> Vec<TextBlock> {
    group_lines_into_blocks(group_spans_into_lines(spans))
}

/// Approximate baseline in top-left page space.
fn baseline(span: &Span) -> f32 {
    span.bbox.y1 - span.size * 0.2
}

fn line_baseline(line: &Line) -> f32 {
    line.spans.first().map(baseline).unwrap_or(line.bbox.y1)
}

/// Group spans into lines based on baseline position.
pub fn group_spans_into_lines(mut spans: Vec<Span>) -> Vec<Line> {
    if spans.is_empty() {
        return vec![];
    }

    // Top to bottom, then left to right
    spans.sort_by(|a, b| {
        baseline(a)
            .partial_cmp(&baseline(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y = baseline(&span);
        let tolerance = span.size * LINE_TOLERANCE;

        match current_y {
            Some(line_y) if (y - line_y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(Line::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::from_spans(current));
    }

    lines
}

/// Group lines into blocks (paragraphs) based on spacing.
pub fn group_lines_into_blocks(lines: Vec<Line>) -> Vec<TextBlock> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock::from_lines(current));
    }

    log::trace!("Grouped text into {} blocks", blocks.len());
    blocks
}

fn average_line_spacing(lines: &[Line]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (line_baseline(&w[1]) - line_baseline(&w[0])).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if a new block should start.
fn should_break_block(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    let spacing = (line_baseline(curr) - line_baseline(prev)).abs();
    if spacing > avg_spacing * BLOCK_GAP_FACTOR {
        return true;
    }

    if (prev.font_size() - curr.font_size()).abs() > BLOCK_SIZE_DELTA {
        return true;
    }

    (prev.bbox.x0 - curr.bbox.x0).abs() > BLOCK_INDENT_DELTA
}
