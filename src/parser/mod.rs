// Parser module for extracting structure from markdown documents

pub mod frontmatter;
pub mod headers;

pub use frontmatter::*;
pub use headers::extract_headers;
