pub mod ledger;
pub mod scoring;
pub mod session;
pub mod words;

// Re-export main components
pub use ledger::*;
pub use scoring::*;
pub use session::*;
pub use words::*;
