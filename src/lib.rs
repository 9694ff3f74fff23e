pub mod config;
pub mod error;
pub mod inspector;
pub mod render;
pub mod report;
pub mod scan;
pub mod slot;
pub mod version;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result, SlotError};
pub use inspector::{Exit, Inspector};
pub use report::{Persistency, SlotInfo, SlotKind, SlotOutcome, SlotReport};
