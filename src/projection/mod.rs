//! Read-only views over a stream's spurts.
//!
//! Projections are derived on demand from the stored sequence and never
//! written back, so switching view modes costs nothing and cannot disturb
//! segmentation.

pub mod render;

use serde::Serialize;

use crate::models::{Spurt, Stream, ViewMode};
use crate::segmentation::gap_ms;

/// Gaps at or below this are drawn without a seconds label.
const GAP_LABEL_MIN_MS: i64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WallItem<'a> {
    /// Vertical space before a spurt that opened a paragraph.
    ParagraphBreak,
    Spurt { spurt: &'a Spurt },
}

/// What sits between two rows of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GapIndicator {
    /// Full-width divider.
    #[serde(rename_all = "camelCase")]
    ParagraphBreak { gap_ms: i64 },
    /// Bar scaled against the paragraph threshold, capped at 100%.
    #[serde(rename_all = "camelCase")]
    Pause { gap_ms: i64, width_percent: f64 },
}

impl GapIndicator {
    fn new(gap_ms: i64, paragraph_break: bool, paragraph_threshold_ms: u64) -> Self {
        if paragraph_break {
            GapIndicator::ParagraphBreak { gap_ms }
        } else {
            GapIndicator::Pause {
                gap_ms,
                width_percent: pause_width_percent(gap_ms, paragraph_threshold_ms),
            }
        }
    }

    pub fn gap_ms(&self) -> i64 {
        match self {
            GapIndicator::ParagraphBreak { gap_ms } | GapIndicator::Pause { gap_ms, .. } => *gap_ms,
        }
    }

    pub fn is_paragraph_break(&self) -> bool {
        matches!(self, GapIndicator::ParagraphBreak { .. })
    }

    /// Seconds label such as `3.0s`, only for gaps longer than half a second.
    pub fn label(&self) -> Option<String> {
        let gap = self.gap_ms();
        (gap > GAP_LABEL_MIN_MS).then(|| format!("{:.1}s", gap as f64 / 1000.0))
    }
}

/// One row of an ordered or reversed list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry<'a> {
    pub spurt: &'a Spurt,
    /// Indicator drawn below this row; `None` on the last displayed row.
    pub gap_after: Option<GapIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "items", rename_all = "camelCase")]
pub enum Projection<'a> {
    Wall(Vec<WallItem<'a>>),
    Ordered(Vec<ListEntry<'a>>),
    Reversed(Vec<ListEntry<'a>>),
}

impl<'a> Projection<'a> {
    pub fn mode(&self) -> ViewMode {
        match self {
            Projection::Wall(_) => ViewMode::Wall,
            Projection::Ordered(_) => ViewMode::Ordered,
            Projection::Reversed(_) => ViewMode::Reversed,
        }
    }
}

/// Projects a stream using its own view mode.
pub fn project(stream: &Stream, paragraph_threshold_ms: u64) -> Projection<'_> {
    project_as(&stream.spurts, stream.view_mode, paragraph_threshold_ms)
}

pub fn project_as(spurts: &[Spurt], mode: ViewMode, paragraph_threshold_ms: u64) -> Projection<'_> {
    match mode {
        ViewMode::Wall => Projection::Wall(wall(spurts)),
        ViewMode::Ordered => Projection::Ordered(ordered(spurts, paragraph_threshold_ms)),
        ViewMode::Reversed => Projection::Reversed(reversed(spurts, paragraph_threshold_ms)),
    }
}

/// Storage order, with a break before every paragraph start except the first item.
pub fn wall(spurts: &[Spurt]) -> Vec<WallItem<'_>> {
    let mut items = Vec::with_capacity(spurts.len());
    for (i, spurt) in spurts.iter().enumerate() {
        if i > 0 && spurt.is_paragraph_start {
            items.push(WallItem::ParagraphBreak);
        }
        items.push(WallItem::Spurt { spurt });
    }
    items
}

/// Storage order. The indicator below each row describes the silence before
/// the next row and becomes a divider when that next row opened a paragraph.
pub fn ordered(spurts: &[Spurt], paragraph_threshold_ms: u64) -> Vec<ListEntry<'_>> {
    spurts
        .iter()
        .enumerate()
        .map(|(i, spurt)| {
            let gap_after = spurts.get(i + 1).map(|next| {
                GapIndicator::new(
                    gap_ms(spurt, next.created_at),
                    next.is_paragraph_start,
                    paragraph_threshold_ms,
                )
            });
            ListEntry { spurt, gap_after }
        })
        .collect()
}

/// Newest first. The indicator below each row describes the silence between
/// the older row beneath it and this one.
///
/// Divider placement is keyed to the displayed (newer) row's own flag rather
/// than the row beneath it. That mirrors `ordered` only in gap size: the
/// divider ends up directly under the spurt that opened the paragraph.
pub fn reversed(spurts: &[Spurt], paragraph_threshold_ms: u64) -> Vec<ListEntry<'_>> {
    let display: Vec<&Spurt> = spurts.iter().rev().collect();
    display
        .iter()
        .enumerate()
        .map(|(i, &spurt)| {
            let gap_after = display.get(i + 1).map(|older| {
                GapIndicator::new(
                    gap_ms(older, spurt.created_at),
                    spurt.is_paragraph_start,
                    paragraph_threshold_ms,
                )
            });
            ListEntry { spurt, gap_after }
        })
        .collect()
}

/// Seconds of typing across the stream.
pub fn total_duration(stream: &Stream) -> f64 {
    stream.total_duration()
}

/// Gap relative to the paragraph threshold, clamped to `0.0..=1.0`.
pub fn pause_ratio(gap_ms: i64, paragraph_threshold_ms: u64) -> f64 {
    if paragraph_threshold_ms == 0 {
        return if gap_ms > 0 { 1.0 } else { 0.0 };
    }
    (gap_ms.max(0) as f64 / paragraph_threshold_ms as f64).min(1.0)
}

pub fn pause_width_percent(gap_ms: i64, paragraph_threshold_ms: u64) -> f64 {
    pause_ratio(gap_ms, paragraph_threshold_ms) * 100.0
}
