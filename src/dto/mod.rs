pub mod bet;
pub mod report;
pub mod persisted;

// Re-export commonly used types for convenience
pub use bet::*;
pub use report::*;
pub use persisted::*;
