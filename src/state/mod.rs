/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The infinite-scroll pagination loader (loader.rs)
/// - The detail view's original/current image pair (viewer.rs)

pub mod data;
pub mod loader;
pub mod viewer;
