// Document layout: static font metrics, word wrap and pagination.
// CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod paginate;

// Re-export the public API consumed by the renderer and startup code.
pub use font_metrics::{default_page_config, FontFamily, PageConfig};
pub use paginate::{layout_document, DocumentLayout};
