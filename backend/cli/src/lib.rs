//! HTTP surface and CLI commands of the Draftschema inference proxy.

pub mod api;
pub mod doctor_cmd;
pub mod models_cmd;
pub mod status_cmd;

pub use api::{build_router, AppState};
