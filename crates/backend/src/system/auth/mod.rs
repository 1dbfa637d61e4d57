pub mod extractor;
pub mod session;
