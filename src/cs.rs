pub mod ecc;
pub mod error;

// Re-export the block codes
pub use ecc::*;
