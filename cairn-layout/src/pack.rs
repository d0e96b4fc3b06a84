//! Column packing.
//!
//! Entries are placed one after another on the lowest available baseline.
//! Each column tracks its current height; an entry spanning `n` columns is
//! placed on the window of `n` adjacent columns whose tallest column is
//! the shortest (first window wins ties), and every covered column is
//! raised to `baseline + height + gutter`.
//!
//! # Expand regions
//!
//! When an expanded container is placed, the per-column offsets from the
//! shortest column are remembered and all columns are flattened to
//! `max + expand_space`, so the container's sub-entries pack against a
//! common baseline. Once those sub-entries have been placed, the columns
//! are rebased to `max + offset + expand_space`, restoring the skyline
//! the rest of the layout had before the region was opened.

use cairn_api::Origin;

/// Column count and horizontal placement for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnGeometry {
    /// Entries per row. Never zero: a container narrower than one column
    /// still gets a single column.
    pub columns: usize,
    /// Left margin that centers the packed columns in the container.
    pub margin: f64,
    pub column_width: f64,
    pub gutter: f64,
}

impl ColumnGeometry {
    pub fn new(container_width: f64, column_width: f64, gutter: f64) -> Self {
        let fit = (container_width / (column_width + gutter)).floor();
        let columns = if !fit.is_finite() || fit < 1.0 { 1 } else { fit as usize };
        let count = columns as f64;
        let content_width = count * column_width + (count - 1.0) * gutter;
        Self {
            columns,
            margin: (container_width - content_width) * 0.5,
            column_width,
            gutter,
        }
    }

    /// Left offset of a column.
    pub fn left(&self, column: usize) -> f64 {
        self.margin + column as f64 * (self.column_width + self.gutter)
    }

    /// Number of adjacent columns an entry of `width` occupies, clamped to
    /// `1..=columns`.
    pub fn span_for(&self, width: f64) -> usize {
        let raw = ((width + self.gutter) / (self.column_width + self.gutter)).ceil();
        if raw.is_nan() || raw < 1.0 {
            1
        } else if raw >= self.columns as f64 {
            self.columns
        } else {
            raw as usize
        }
    }
}

/// Where an entry landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub column: usize,
    pub span: usize,
    /// Column height the entry sits on.
    pub baseline: f64,
}

/// Running column heights for one full packing pass.
#[derive(Debug, Clone)]
pub struct ColumnPacker {
    geometry: ColumnGeometry,
    expand_space: f64,
    heights: Vec<f64>,
    /// Sub-entries of the open expand region still to be placed.
    embedded: usize,
    /// Per-column offsets captured when the region was opened.
    height_diffs: Vec<f64>,
}

impl ColumnPacker {
    /// Start a pass. Columns are seeded with the gutter when anchored to
    /// the bottom edge, with zero when anchored to the top edge.
    pub fn new(geometry: ColumnGeometry, origin: Origin, expand_space: f64) -> Self {
        let seed = match origin {
            Origin::Top => 0.0,
            Origin::Bottom => geometry.gutter,
        };
        Self {
            geometry,
            expand_space,
            heights: vec![seed; geometry.columns],
            embedded: 0,
            height_diffs: Vec::new(),
        }
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Place the next entry. `full_row` entries (blocks) span every column.
    pub fn place(&mut self, width: f64, height: f64, full_row: bool) -> Placement {
        self.settle_region();

        let span = if full_row {
            self.geometry.columns
        } else {
            self.geometry.span_for(width)
        };

        let (column, baseline) = self.lowest_window(span);
        for h in &mut self.heights[column..column + span] {
            *h = baseline + height + self.geometry.gutter;
        }

        Placement {
            column,
            span,
            baseline,
        }
    }

    /// Open an expand region for the `embedded` sub-entries that follow.
    pub fn open_region(&mut self, embedded: usize) {
        self.embedded = embedded;
        let max = nan_max(&self.heights);
        let min = nan_min(&self.heights);
        self.height_diffs = self.heights.iter().map(|h| h - min).collect();
        for h in &mut self.heights {
            *h = max + self.expand_space;
        }
    }

    /// Whether sub-entries of an expand region are still being placed.
    pub fn in_region(&self) -> bool {
        self.embedded > 0
    }

    /// Height of the tallest column.
    pub fn content_height(&self) -> f64 {
        nan_max(&self.heights)
    }

    /// Close a finished expand region, or count down one embedded entry.
    fn settle_region(&mut self) {
        if self.embedded == 0 && !self.height_diffs.is_empty() {
            let max = nan_max(&self.heights);
            for (h, diff) in self.heights.iter_mut().zip(&self.height_diffs) {
                *h = max + diff + self.expand_space;
            }
            self.height_diffs.clear();
        } else if self.embedded > 0 {
            self.embedded -= 1;
        }
    }

    /// Sliding-window minimax: the start column whose `span`-wide window
    /// has the smallest tallest column, and that column's height.
    fn lowest_window(&self, span: usize) -> (usize, f64) {
        let mut best: Option<(usize, f64)> = None;
        for (start, window) in self.heights.windows(span).enumerate() {
            let mut tallest = window[0];
            for &h in &window[1..] {
                if h > tallest {
                    tallest = h;
                }
            }
            let lower = match best {
                None => true,
                Some((_, lowest)) => tallest < lowest,
            };
            if lower {
                best = Some((start, tallest));
            }
        }
        best.unwrap_or((0, 0.0))
    }
}

/// Maximum that propagates NaN, so a missing measurement poisons the
/// layout visibly instead of being skipped.
fn nan_max(values: &[f64]) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |acc, &v| {
        if acc.is_nan() || v.is_nan() { f64::NAN } else { acc.max(v) }
    })
}

fn nan_min(values: &[f64]) -> f64 {
    values.iter().fold(f64::INFINITY, |acc, &v| {
        if acc.is_nan() || v.is_nan() { f64::NAN } else { acc.min(v) }
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn packer(container_width: f64) -> ColumnPacker {
        ColumnPacker::new(ColumnGeometry::new(container_width, 100.0, 10.0), Origin::Bottom, 50.0)
    }

    #[test]
    fn test_geometry_columns_and_margin() {
        let geometry = ColumnGeometry::new(220.0, 100.0, 10.0);
        assert_eq!(geometry.columns, 2);
        assert_eq!(geometry.margin, 5.0);
        assert_eq!(geometry.left(1), 115.0);
    }

    #[test]
    fn test_narrow_container_gets_one_column() {
        let geometry = ColumnGeometry::new(50.0, 100.0, 10.0);
        assert_eq!(geometry.columns, 1);
        assert_eq!(geometry.margin, -25.0);
    }

    #[test]
    fn test_zero_stride_gets_one_column() {
        let geometry = ColumnGeometry::new(220.0, 0.0, 0.0);
        assert_eq!(geometry.columns, 1);
        assert_eq!(geometry.span_for(50.0), 1);

        let mut packer = ColumnPacker::new(geometry, Origin::Bottom, 50.0);
        let placement = packer.place(50.0, 10.0, false);
        assert_eq!((placement.column, placement.baseline), (0, 0.0));
        assert_eq!(packer.heights(), &[10.0]);
    }

    #[test]
    fn test_span_clamped_to_columns() {
        let geometry = ColumnGeometry::new(340.0, 100.0, 10.0);
        assert_eq!(geometry.columns, 3);
        assert_eq!(geometry.span_for(100.0), 1);
        assert_eq!(geometry.span_for(101.0), 2);
        assert_eq!(geometry.span_for(210.0), 2);
        assert_eq!(geometry.span_for(5000.0), 3);
        assert_eq!(geometry.span_for(f64::NAN), 1);
        assert_eq!(geometry.span_for(0.0), 1);
    }

    #[test]
    fn test_three_item_scenario() {
        let mut packer = packer(220.0);

        let a = packer.place(100.0, 50.0, false);
        let b = packer.place(100.0, 30.0, false);
        let c = packer.place(100.0, 40.0, false);

        assert_eq!((a.column, a.baseline), (0, 10.0));
        assert_eq!((b.column, b.baseline), (1, 10.0));
        assert_eq!((c.column, c.baseline), (1, 50.0));
        assert_eq!(packer.heights(), &[70.0, 100.0]);
    }

    #[test]
    fn test_equal_heights_pack_evenly() {
        let mut packer = packer(450.0); // 4 columns
        let h = 40.0;
        for _ in 0..10 {
            packer.place(100.0, h, false);
        }

        let heights = packer.heights();
        let min = heights.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = packer.content_height();
        assert!(max - min <= h + 10.0);
        // ceil(10 / 4) rows on top of the gutter seed
        assert_eq!(max, 10.0 + 3.0 * (h + 10.0));
    }

    #[test]
    fn test_wide_entry_takes_lowest_window() {
        let mut packer = packer(340.0); // 3 columns
        packer.place(100.0, 100.0, false); // col 0 -> 120
        packer.place(100.0, 10.0, false); // col 1 -> 30
        packer.place(100.0, 20.0, false); // col 2 -> 40

        let wide = packer.place(210.0, 5.0, false);

        assert_eq!(wide.span, 2);
        assert_eq!(wide.column, 1);
        assert_eq!(wide.baseline, 40.0);
        assert_eq!(packer.heights(), &[120.0, 55.0, 55.0]);
    }

    #[test]
    fn test_full_row_spans_everything() {
        let mut packer = packer(340.0);
        packer.place(100.0, 100.0, false);

        let block = packer.place(10.0, 20.0, true);

        assert_eq!(block.span, 3);
        assert_eq!(block.column, 0);
        assert_eq!(block.baseline, 120.0);
        assert_eq!(packer.heights(), &[150.0, 150.0, 150.0]);
    }

    #[test]
    fn test_expand_region_flattens_then_restores_offsets() {
        let mut packer = packer(220.0);
        packer.place(100.0, 50.0, false); // [70, 10]
        packer.open_region(2); // diffs [60, 0], heights [120, 120]
        assert_eq!(packer.heights(), &[120.0, 120.0]);
        assert!(packer.in_region());

        let first = packer.place(220.0, 20.0, false);
        assert_eq!(first.baseline, 120.0);
        packer.place(100.0, 30.0, false);
        assert!(!packer.in_region());

        // Next entry after the region: rebased to max + diff + expand_space.
        let after = packer.place(100.0, 10.0, false);
        // region left [190, 150]; rebased to [300, 240]
        assert_eq!(after.column, 1);
        assert_eq!(after.baseline, 240.0);
        assert_eq!(packer.heights(), &[300.0, 260.0]);
    }

    #[test]
    fn test_nan_height_propagates() {
        let mut packer = packer(220.0);
        packer.place(100.0, f64::NAN, false);
        assert!(packer.content_height().is_nan());
    }
}
