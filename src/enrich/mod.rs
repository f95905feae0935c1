//! Record enrichment via secondary detail endpoints

mod enricher;


pub use enricher::{DetailEnricher, Enricher};
