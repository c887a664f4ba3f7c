pub mod document;
pub mod result;
