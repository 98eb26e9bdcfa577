//! Grid stitching
//!
//! Assembles a width×height canvas centered on a geographic coordinate from
//! 256×256 tiles. [`GridPlan`] decides which tiles are needed and where they
//! go; [`Stitcher`] fetches them and composites the canvas.

mod grid;
mod stitcher;

pub use grid::{AxisPlan, GridPlan, TilePlacement};
pub use stitcher::{StitchError, StitchedCanvas, Stitcher};
