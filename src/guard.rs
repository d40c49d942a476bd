//! Navigation guard: per-transition allow/redirect decision.
//!
//! ARCHITECTURE
//! ============
//! `decide` is a pure function of (target, origin, session snapshot, config).
//! `NavigationGuard` wraps it with the two impure parts: reading the session
//! store and emitting the "unauthorized" notification. Rules apply in a fixed
//! order and the first match wins:
//!
//! 1. auth required anywhere on the chain, no token  -> login, remembering target
//! 2. role allow-list on the chain, role missing     -> default landing page
//! 3. login page while already signed in             -> root
//! 4. otherwise                                      -> proceed

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use std::sync::Arc;

use crate::notify::Notifier;
use crate::routes::{DEFAULT_PATH, LOGIN_PATH, Location, MatchedRoute, ROOT_PATH};
use crate::session::{SessionSnapshot, SessionStore};

pub const MSG_UNAUTHORIZED: &str = "you are not authorized to access this page";
/// Query key carrying the originally requested path on a login redirect.
pub const REDIRECT_QUERY_KEY: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub login_path: String,
    pub default_path: String,
    pub root_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH.to_owned(),
            default_path: DEFAULT_PATH.to_owned(),
            root_path: ROOT_PATH.to_owned(),
        }
    }
}

/// Terminal outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// `redirect` is the full path the user asked for.
    RedirectToLogin { redirect: String },
    RedirectToDefault,
    RedirectToRoot,
}

impl Decision {
    /// Where the router should go instead, `None` for `Proceed`.
    #[must_use]
    pub fn location(&self, config: &GuardConfig) -> Option<Location> {
        match self {
            Self::Proceed => None,
            Self::RedirectToLogin { redirect } => {
                Some(Location::new(&config.login_path).with_query(REDIRECT_QUERY_KEY, redirect.clone()))
            }
            Self::RedirectToDefault => Some(Location::new(&config.default_path)),
            Self::RedirectToRoot => Some(Location::new(&config.root_path)),
        }
    }

    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Pure decision. `from` is accepted for router parity and does not affect
/// the outcome.
#[must_use]
pub fn decide(
    to: &MatchedRoute,
    _from: Option<&MatchedRoute>,
    session: &SessionSnapshot,
    config: &GuardConfig,
) -> Decision {
    if to.requires_auth() && !session.is_authenticated() {
        return Decision::RedirectToLogin { redirect: to.full_path() };
    }

    let required = to.required_roles();
    if !required.is_empty() {
        let permitted = session.role().is_some_and(|role| required.contains(&role));
        if !permitted {
            return Decision::RedirectToDefault;
        }
    }

    if to.path() == config.login_path && session.is_authenticated() {
        return Decision::RedirectToRoot;
    }

    Decision::Proceed
}

/// `decide` bound to the live session and the notification port.
#[derive(Clone)]
pub struct NavigationGuard {
    config: GuardConfig,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(config: GuardConfig, session: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, session, notifier }
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Evaluate one transition. Never fails; a role mismatch notifies once.
    pub fn evaluate(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> Decision {
        let decision = self.check(to, from);
        if decision == Decision::RedirectToDefault {
            self.report_unauthorized(to);
        }
        decision
    }

    /// `decide` against the current session, without notifying.
    #[must_use]
    pub fn check(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> Decision {
        let snapshot = self.session.snapshot();
        let decision = decide(to, from, &snapshot, &self.config);
        match &decision {
            Decision::Proceed => {}
            Decision::RedirectToDefault => {
                tracing::debug!(to = %to.full_path(), role = ?snapshot.role(), "guard: role not permitted");
            }
            other => tracing::debug!(to = %to.full_path(), decision = ?other, "guard: redirect"),
        }
        decision
    }

    /// Emit the "not authorized" notification for a blocked transition.
    pub fn report_unauthorized(&self, to: &MatchedRoute) {
        tracing::info!(to = %to.full_path(), "navigation blocked by role");
        self.notifier.notify_error(MSG_UNAUTHORIZED);
    }
}
