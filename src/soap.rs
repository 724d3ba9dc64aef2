//! Client side of the ERP backend's SOAP 1.1 API.
//!
//! Every call follows one convention: flat parameters inside a namespaced
//! method element, and a result found at `{Method}Response.{Method}Result`.

pub mod envelope;
mod error;
mod gateway;
mod operation;
mod params;
pub mod parse;
mod session;
pub mod transport;

pub use error::GatewayError;
pub use gateway::{Gateway, extract_result};
pub use operation::Operation;
pub use params::{Params, Scalar};
pub use session::{CONNECT_METHOD, Session};
pub use transport::{HyperTransport, Transport};
