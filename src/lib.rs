//! Client-side session and access-control layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three coupled pieces decide, for every outbound request and every route
//! navigation, whether the acting user is authenticated and authorized:
//!
//! - `session`: token + user profile over an injected `storage` substrate
//! - `http`: credential attachment, envelope unwrapping, failure classification
//! - `guard`: allow/redirect decision per route transition
//!
//! `routes` and `router` supply the route tree and the driver that applies
//! guard decisions; `api` holds the login/register/logout calls; `notify` is
//! the user-facing error port.

pub mod api;
pub mod config;
pub mod guard;
pub mod http;
pub mod notify;
pub mod router;
pub mod routes;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use guard::{Decision, GuardConfig, NavigationGuard, decide};
pub use http::{ApiRequest, ErrorKind, Pipeline, RequestError};
pub use notify::{Notifier, TracingNotifier};
pub use router::{Navigator, Router, RouterError};
pub use routes::{Location, MatchedRoute, RouteDescriptor, RouteTable, app_routes};
pub use session::{SessionSnapshot, SessionStore, UserProfile};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
