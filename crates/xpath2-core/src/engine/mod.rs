pub mod collation;
pub mod runtime;
