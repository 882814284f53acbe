//! One-time email verification codes.

pub mod generator;

pub use generator::CodeGenerator;
