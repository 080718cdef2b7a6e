// SCRUMForge utilities - paths, logging, string helpers

pub mod logging;
pub mod paths;
pub mod strings;

pub use logging::*;
pub use paths::*;
pub use strings::*;
