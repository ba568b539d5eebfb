// Pagination engine: page geometry, the content tree index and the two layout strategies.
// Pure computation, no I/O. Callers recompute whenever the tree or margin source changes.

pub mod geometry;
pub mod paginator;
pub mod tree;

// Re-export the public API consumed by the session coordinator and handlers.
pub use geometry::{default_page_geometry, PageGeometry};
pub use paginator::{
    compute_auto_layout, compute_manual_layout, MarginSource, PageLayout, SectionPlacement,
};
pub use tree::{BlockIndex, BlockKey, ContentTree};
