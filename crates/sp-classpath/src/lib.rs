//! Input classification and classpath assembly.
//!
//! The classifier decides, per input unit, which partition it belongs to and
//! which file filter applies; the builder appends the resulting entries to a
//! [`sp_core::ShrinkConfig`] in input order.

pub mod archive;
pub mod builder;
pub mod classifier;

pub use builder::ClasspathBuilder;
pub use classifier::{classify, Classification};
