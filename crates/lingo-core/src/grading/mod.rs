//! Test grading engine.
//!
//! Parses inline answer markup from stored test content into typed blank
//! descriptors, grades submissions against the derived answer key, and
//! scores drag-and-drop tile ordering for shuffle tests.

mod parser;
mod score;
mod tiles;

pub use parser::{
    parse_test_content, Blank, BlankKind, BlankWidget, ParsedTest, RenderSegment, Segment,
    WidgetKind,
};
pub use score::{grade_standard, GradedField, StandardGrade};
pub use tiles::{
    grade_tile_order, paragraph_tiles, sentence_tiles, shuffle_tiles, GradedTile, Tile, TileGrade,
};
