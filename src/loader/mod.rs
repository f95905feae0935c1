//! YAML loader for connector definitions

mod parser;
mod types;


pub use parser::{load_connector, load_connector_from_str};
pub use types::{
    AuthDefinition, CheckDefinition, ConnectorDefinition, EnrichmentDefinition, HttpDefinition,
    IncrementalDefinition, PaginationDefinition, RequestDefinition, StreamDefinition,
};
