/// Routine reasons a point has no match in the target frame.
///
/// None of these are fatal; `PatternDetector::detect` collapses all of them
/// into `None`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error(
        "window out of bounds (row0={row0}, col0={col0}, rows={rows}, cols={cols}) for {width}x{height} image"
    )]
    OutOfBounds {
        row0: i64,
        col0: i64,
        rows: usize,
        cols: usize,
        width: usize,
        height: usize,
    },
    #[error("template {template_rows}x{template_cols} does not fit search window {search_rows}x{search_cols}")]
    TemplateLargerThanSearch {
        template_rows: usize,
        template_cols: usize,
        search_rows: usize,
        search_cols: usize,
    },
    #[error("weak match (score={score:.4}, threshold={threshold:.4})")]
    WeakMatch { score: f64, threshold: f64 },
    #[error("peak on surface border (row={row}, col={col})")]
    AmbiguousMatch { row: usize, col: usize },
    #[error("degenerate correlation peak")]
    DegeneratePeak,
}

/// Setup mistakes rejected when a detector is constructed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("pattern size must be odd and positive (got {height}x{width})")]
    EvenPatternSize { height: usize, width: usize },
    #[error("{axis} search range is inverted (min={min}, max={max})")]
    InvertedRange {
        axis: &'static str,
        min: i32,
        max: i32,
    },
    #[error("{axis} search range [{min}, {max}] leaves no interior surface cell")]
    RangeTooNarrow {
        axis: &'static str,
        min: i32,
        max: i32,
    },
    #[error("correlation threshold must be finite (got {0})")]
    InvalidThreshold(f64),
    #[error("tracker step must be at least 1")]
    InvalidStep,
}
