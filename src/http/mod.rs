//! Request/response pipeline.
//!
//! SYSTEM CONTEXT
//! ==============
//! `request` defines the call descriptor endpoint wrappers build, `transport`
//! moves bytes (reqwest in production, mocks in tests), `error` holds the
//! failure taxonomy, and `pipeline` ties them to the session store and the
//! notification/navigation ports.

pub mod error;
pub mod pipeline;
pub mod request;
pub mod transport;

pub use error::{ErrorKind, RequestError};
pub use pipeline::Pipeline;
pub use request::ApiRequest;
pub use transport::{OutgoingRequest, RawResponse, ReqwestTransport, Transport, TransportError};
