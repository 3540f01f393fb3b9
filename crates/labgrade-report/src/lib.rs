//! Presentation of a [`labgrade_core::GradeReport`]: SVG charts, the
//! interactive HTML dashboard and the paginated print document.

pub mod chart;
pub mod document;
pub mod html;

pub use chart::render_svg;
pub use document::{generate_document, write_document};
pub use html::{generate_html, write_html_report};
