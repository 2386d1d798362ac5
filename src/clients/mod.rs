//! Client aggregate: the data model and the dashboard read API.

pub mod model;
pub mod query;
pub mod routes;

pub use model::{Client, ClientAggregate, Document, ProgressMetric, Reminder};
pub use query::ClientQuery;
pub use routes::{ClientRouteState, client_routes};
