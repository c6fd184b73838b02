mod batch;
mod database;
mod doc;
mod encoding;
mod error;
mod executor;
mod expression;
mod planner;
mod query;

pub use batch::Batch;
pub use database::Database;
pub use doc::{Doc, CREATED_FIELD, ID_FIELD, UPDATED_FIELD};
pub use error::DbError;
pub use query::{Explain, IndexHint, Query};
pub use shale_query::SubQuery;
