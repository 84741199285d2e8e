pub mod lifecycle;
pub mod query_builder;
pub mod reports;
pub mod shop;
pub mod validator;

pub use crate::domain::model::{ResultSet, Statement};
pub use crate::domain::ports::{Console, DataStore};
pub use crate::utils::error::Result;
