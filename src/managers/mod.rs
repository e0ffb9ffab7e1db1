pub mod graphql;
pub mod ingest;
pub mod resources;
