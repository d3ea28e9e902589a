//! License file formats and payload decoding.

pub mod codec;
pub mod models;
pub mod timestamp;
