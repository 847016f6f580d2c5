//! Test utilities for pipeline tests.

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{
    ClosedJobQueue, MockImageGenerator, MockNotifier, MockPublisher, MockRasterizer, MockTextGenerator,
    MockVectorGenerator, TextBehavior, valid_svg,
};
