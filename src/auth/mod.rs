pub mod access;
pub mod extractor;
pub mod jwt;
