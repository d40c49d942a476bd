//! Router driver: applies guard decisions to navigation requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard only answers "proceed or go elsewhere". The driver parses the
//! requested path, resolves it, follows record-level redirects (`/` ->
//! `/dashboard`), consults the guard, and keeps following until a target is
//! accepted. It is also the `Navigator` the request pipeline pushes `/login`
//! into when a session expires.
//!
//! TRADE-OFFS
//! ==========
//! A 401-triggered push and a user navigation may interleave. Each navigation
//! reads whatever session is current when it runs; nothing serializes them.

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

use std::sync::{Mutex, PoisonError};

use crate::guard::{Decision, NavigationGuard};
use crate::routes::{Location, MatchedRoute, RouteTable};

/// Upper bound on redirects followed for one navigation.
pub const MAX_REDIRECTS: usize = 8;

/// Capability to move the application to another route.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("no route matches {0}")]
    NotFound(String),

    #[error("too many redirects navigating to {0}")]
    RedirectLoop(String),
}

pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    current: Mutex<Option<MatchedRoute>>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable, guard: NavigationGuard) -> Self {
        Self { table, guard, current: Mutex::new(None) }
    }

    /// Location of the last accepted navigation.
    #[must_use]
    pub fn current(&self) -> Option<Location> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|m| m.location.clone())
    }

    /// Navigate to `target`, returning where the user actually lands.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotFound`] when a path (requested or redirected to) has
    /// no route; [`RouterError::RedirectLoop`] after [`MAX_REDIRECTS`] hops.
    /// A role denial notifies once per call, however many hops it spans.
    pub fn navigate(&self, target: &str) -> Result<Location, RouterError> {
        let from = self.current.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let mut location = Location::parse(target);
        let mut notified = false;

        for _ in 0..=MAX_REDIRECTS {
            let to = self
                .table
                .resolve(&location)
                .ok_or_else(|| RouterError::NotFound(location.full_path()))?;

            if let Some(redirect) = to.record().and_then(|r| r.redirect.as_deref()) {
                // A bare redirect target inherits the requested query.
                let mut next = Location::parse(redirect);
                if next.query.is_empty() {
                    next.query = location.query.clone();
                }
                location = next;
                continue;
            }

            let decision = self.guard.check(&to, from.as_ref());
            if decision == Decision::RedirectToDefault && !notified {
                self.guard.report_unauthorized(&to);
                notified = true;
            }

            match decision.location(self.guard.config()) {
                Some(next) => location = next,
                None => {
                    let landed = to.location.clone();
                    tracing::debug!(requested = target, landed = %landed, "navigation complete");
                    *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(to);
                    return Ok(landed);
                }
            }
        }

        Err(RouterError::RedirectLoop(target.to_owned()))
    }
}

impl Navigator for Router {
    fn push(&self, path: &str) {
        if let Err(e) = self.navigate(path) {
            tracing::warn!(path, error = %e, "navigation failed");
        }
    }
}
