// Output generation module

pub mod console;
pub mod csv;
pub mod exporter;
pub mod html;
pub mod json;
pub mod live;
pub mod templates;

pub use exporter::*;
pub use html::*;
pub use live::*;
pub use templates::*;
