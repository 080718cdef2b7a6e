pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod persistence;

pub use config::Config;
pub use entities::*;
pub use error::{ErrorKind, ScrumError, ScrumResult};
pub use events::{EventBus, ScrumEvent, EventSink};
pub use ids::{generate_id, EntityKind};
pub use persistence::{atomic_write, EntityStore, FileLock};
