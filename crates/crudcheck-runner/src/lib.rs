//! crudcheck-runner: Request building and execution against a pet service
//!
//! The executor walks cases in dependency order and sends each built request
//! through a [`Transport`]. [`HttpTransport`] is the live implementation;
//! tests substitute in-memory services.

pub mod executor;
pub mod request;
pub mod transport;

pub use executor::{RunError, Runner};
pub use request::{BuildError, RequestBuilder};
pub use transport::{HttpTransport, Transport, TransportError};
