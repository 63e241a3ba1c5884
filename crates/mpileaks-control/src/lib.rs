//! Process-wide control surface: configuration, the lazily-initialized
//! global context, and the `on_init`/`on_control`/`on_finalize` hooks
//! `mpileaks-interpose` calls from the lifecycle wrappers.

mod config;
mod context;

pub use config::Config;
pub use context::{on_control, on_finalize, on_init, Context, CONTEXT};
