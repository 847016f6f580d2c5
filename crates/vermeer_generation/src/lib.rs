//! Post generation for Vermeer.
//!
//! Turns a content plan plus its unused source material into a
//! [`GeneratedPost`](vermeer_core::GeneratedPost):
//!
//! 1. [`SourceSelector`] picks candidate items (`recent` or `random`)
//! 2. [`assemble_context`] builds the channel context and prior-post list
//! 3. [`GenerationOrchestrator`] calls the text generator (hard failure) and,
//!    when the plan asks for one, the [`ImageSynthesizer`] (soft failure)
//!
//! Marking sources used is left to the caller, after the post is stored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod image;
mod orchestrator;
mod selection;
pub mod svg;

pub use context::{AssembledContext, assemble_context};
pub use image::{ImageSynthesizer, media_key, store_image};
pub use orchestrator::GenerationOrchestrator;
pub use selection::{SourceSelector, shuffle_take};
