/// User interface module
///
/// - Infinite-scroll thumbnail grid (grid.rs)
/// - Single image detail view with filters and download (detail.rs)
/// - Scroll visibility trigger for loading the next page (trigger.rs)

pub mod detail;
pub mod grid;
pub mod trigger;
