//! Request handler module
//!
//! Request routing dispatch and the housing query endpoint.

pub mod housing;
pub mod router;

pub use router::handle_request;
