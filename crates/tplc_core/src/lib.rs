//! tplc_core: Core utilities for the tplc template compiler.
//!
//! Provides the 1-based source locations used throughout the compiler
//! pipeline.

pub mod text;

// Re-export commonly used types
pub use text::SourceLocation;
