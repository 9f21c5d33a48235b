pub mod design;
pub mod error;
pub mod prompt;
pub mod schema;
pub mod traits;

pub use design::DesignDocument;
pub use error::ProxyError;
pub use schema::{Note, Relationship, SchemaInferenceResult, Table};
pub use traits::{SchemaProvider, UpstreamReply};
