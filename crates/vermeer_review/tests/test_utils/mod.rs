//! Test utilities for review tests.

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{
    ClosedJobQueue, MockImageGenerator, MockNotifier, MockRasterizer, MockTextGenerator,
    MockVectorGenerator, TextBehavior, valid_svg,
};
