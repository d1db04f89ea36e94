//! The commands resource: model, SQLite store, and HTTP endpoints.

mod model;
mod routes;
mod store;

pub use model::{Command, CommandRequest, CommandStatus, Data};
pub use routes::mount;
pub use store::CommandStore;
