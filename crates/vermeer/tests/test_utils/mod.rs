//! Test utilities for runtime tests.

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{MockNotifier, MockPublisher, MockTextGenerator, NoImages};
