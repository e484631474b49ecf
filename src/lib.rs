//! # CoCo Harvest
//!
//! Tabular extraction from the CoCo correspondence knowledge graph.
//!
//! The library queries the CoCo SPARQL endpoint for biographical and
//! correspondence metadata, converts the typed JSON result bindings into
//! native values and materializes them as polars frames ready for joining,
//! aggregation and Parquet export.
//!
//! The pipeline is linear: a query is POSTed to the endpoint, the JSON
//! result set is deserialized ([`results`]), every bound value is converted
//! through the datatype registry ([`convert`]), the rows are assembled into a
//! typed frame ([`materialize`]) and frames are composed and written out
//! ([`table`]). The extraction operations themselves live in [`queries`].
//!
//! ## Example
//!
//! ```ignore
//! use coco_harvest::{EndpointConfig, Harvester, SparqlClient};
//!
//! let config = EndpointConfig::new("http://ldf.fi/coco/sparql");
//! let harvester = Harvester::new(SparqlClient::new(config)?)?;
//!
//! let counts = harvester.letter_and_actor_counts().await?;
//! println!("{counts}");
//! ```

pub mod convert;
pub mod endpoint;
pub mod error;
pub mod materialize;
pub mod queries;
pub mod results;
pub mod table;

pub use convert::{DatatypeRegistry, Value};
pub use endpoint::{EndpointConfig, SparqlClient};
pub use error::{HarvestError, Result};
pub use materialize::materialize;
pub use queries::Harvester;
pub use results::{BoundValue, SparqlResults};
