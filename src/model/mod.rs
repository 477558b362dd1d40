//! Document data model.

mod document;
mod paragraph;

pub use document::Document;
pub use paragraph::{Paragraph, Run};
