//! Test utilities for generation tests.
//!
//! Scripted fakes for the text, vector, raster and rasterizer capabilities.

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{
    MockImageGenerator, MockRasterizer, MockTextGenerator, MockVectorGenerator, TextBehavior,
    valid_svg,
};
