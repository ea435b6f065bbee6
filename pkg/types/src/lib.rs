pub mod config;
pub mod document;
pub mod kind;
pub mod validate;

pub use document::ResourceDocument;
pub use kind::ResourceKind;
