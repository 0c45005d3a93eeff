//! Typed access to the remote customer and product services.
//!
//! Every outbound call goes through the [`DirectoryGateway`] trait: the HTTP
//! adapter attaches a cached bearer token and translates raw transport
//! failures into the [`DirectoryError`] taxonomy before they reach any
//! business logic. An in-memory implementation backs the test suites.

pub mod enrich;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod token;

pub use enrich::{Enrich, enrich_rows};
pub use error::{DirectoryError, Result};
pub use gateway::{CustomerRecord, DirectoryGateway, ProductRecord, ProductStatus};
pub use http::HttpDirectoryGateway;
pub use memory::InMemoryDirectory;
pub use token::{ServiceCredential, TokenCache};
