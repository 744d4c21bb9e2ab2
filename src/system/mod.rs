//! System-level modules
//!
//! - Logging initialisation
//! - Backend lifecycle (startup, shutdown)

pub mod context;
pub mod logging;

pub use context::AppContext;
pub use logging::init_logging;
