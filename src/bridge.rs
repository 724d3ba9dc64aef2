//! Local HTTP/JSON front for the SOAP gateway.
//!
//! `POST /{method}` with a flat JSON object body invokes `method` and
//! responds with its result as JSON.

pub mod handler;
pub mod server;
