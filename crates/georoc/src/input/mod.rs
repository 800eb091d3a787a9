//! Source files and the views reading them.

mod file;
mod lines;
mod source;

pub use file::{Reference, References, Samples, parse_reference_line};
pub use lines::{Lines, TableBody};
pub use source::SourceFile;
