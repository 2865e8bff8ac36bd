//! Process-wide setup performed once by the binary.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
