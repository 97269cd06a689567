//! PDF report generation: font metrics, a minimal writer and the layout
//! that assembles the final document.

pub mod fonts;
pub mod layout;
pub mod pdf;

pub use layout::render_report;
