//! # warden-entity
//!
//! Domain entity models for Warden. These are plain data structures;
//! persistence mapping lives in `warden-database`.

pub mod user;
