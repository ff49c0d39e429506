//! HTTP server: state, handlers, and the fluent builder

pub mod builder;
pub mod handlers;
pub mod state;

pub use builder::ServerBuilder;
pub use state::AppState;
