pub mod color;
pub mod config;
pub mod destination;
pub mod handler;
pub mod level;
pub mod otel;
pub mod record;
pub mod render;
pub mod trace_context;

pub mod layer;
pub mod env;
pub mod init;

pub use config::{ConfigError, HandlerConfig};
pub use destination::{Destination, SharedBuffer};
pub use handler::{Handler, HandlerError};
pub use level::Level;
pub use record::{AttrValue, Attributes, Record};
