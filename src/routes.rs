//! Static route tree, path resolution, and locations.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard never sees the tree. It sees a `MatchedRoute`: the target
//! location plus the chain of records from the outermost ancestor down to the
//! matched record, which is where `requires_auth` and `roles` are read from.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use std::fmt;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DEFAULT_PATH: &str = "/dashboard";

// =============================================================================
// LOCATION
// =============================================================================

/// Path plus decoded query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: normalize_path(&path.into()), query: Vec::new() }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Parse `"/path?k=v&k2=v2"`. Fragments are dropped.
    #[must_use]
    pub fn parse(full_path: &str) -> Self {
        let without_fragment = full_path.split('#').next().unwrap_or_default();
        let (path, raw_query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
        let query = raw_query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(k), decode_component(v))
            })
            .collect();
        Self { path: normalize_path(path), query }
    }

    /// First value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Path with the percent-encoded query appended.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), std::borrow::Cow::into_owned)
}

/// Leading `/`, no trailing `/` except for the root, no empty segments.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else {
        normalize_path(&format!("{parent}/{child}"))
    }
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// One node of the configured route tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Absolute for top-level routes, relative to the parent for children.
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
    /// Allow-list; empty means no role restriction.
    pub roles: Vec<String>,
    /// Navigating to this exact record continues to `redirect` instead.
    pub redirect: Option<String>,
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }
}

/// Route metadata as seen by the guard: absolute path, no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
    pub roles: Vec<String>,
    pub redirect: Option<String>,
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    pub location: Location,
    /// Outermost ancestor first, matched record last.
    pub matched: Vec<RouteRecord>,
}

impl MatchedRoute {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.location.path
    }

    #[must_use]
    pub fn full_path(&self) -> String {
        self.location.full_path()
    }

    /// The record the path resolved to.
    #[must_use]
    pub fn record(&self) -> Option<&RouteRecord> {
        self.matched.last()
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.matched.iter().any(|r| r.requires_auth)
    }

    /// Union of every `roles` list along the chain, first occurrence order.
    #[must_use]
    pub fn required_roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = Vec::new();
        for role in self.matched.iter().flat_map(|r| r.roles.iter()) {
            if !roles.contains(&role.as_str()) {
                roles.push(role);
            }
        }
        roles
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// Flattened route tree, one chain per reachable path.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    chains: Vec<Vec<RouteRecord>>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        let mut chains = Vec::new();
        for route in &routes {
            flatten(route, ROOT_PATH, &mut Vec::new(), &mut chains);
        }
        Self { chains }
    }

    /// Match `location` against the table. First declared route wins.
    #[must_use]
    pub fn resolve(&self, location: &Location) -> Option<MatchedRoute> {
        let path = normalize_path(&location.path);
        self.chains
            .iter()
            .find(|chain| chain.last().is_some_and(|r| r.path == path))
            .map(|chain| MatchedRoute {
                location: Location { path, query: location.query.clone() },
                matched: chain.clone(),
            })
    }

    /// Parse and match a raw `"/path?query"` string.
    #[must_use]
    pub fn resolve_path(&self, full_path: &str) -> Option<MatchedRoute> {
        self.resolve(&Location::parse(full_path))
    }

    /// Every routable absolute path, in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().filter_map(|c| c.last()).map(|r| r.path.as_str())
    }
}

fn flatten(route: &RouteDescriptor, parent: &str, ancestors: &mut Vec<RouteRecord>, out: &mut Vec<Vec<RouteRecord>>) {
    let path = join_paths(parent, &route.path);
    let record = RouteRecord {
        path: path.clone(),
        name: route.name.clone(),
        requires_auth: route.requires_auth,
        roles: route.roles.clone(),
        redirect: route.redirect.clone(),
    };
    ancestors.push(record);
    out.push(ancestors.clone());
    for child in &route.children {
        flatten(child, &path, ancestors, out);
    }
    ancestors.pop();
}

/// The application's route tree: public login/register, and an authenticated
/// layout whose user-management page is restricted to admins.
#[must_use]
pub fn app_routes() -> RouteTable {
    RouteTable::new(vec![
        RouteDescriptor::new(LOGIN_PATH).named("Login"),
        RouteDescriptor::new(REGISTER_PATH).named("Register"),
        RouteDescriptor::new(ROOT_PATH)
            .requires_auth()
            .redirect(DEFAULT_PATH)
            .children(vec![
                RouteDescriptor::new("dashboard").named("Dashboard"),
                RouteDescriptor::new("users").named("UserList").requires_auth().roles(["admin"]),
                RouteDescriptor::new("merchants").named("MerchantList"),
                RouteDescriptor::new("orders").named("OrderList"),
            ]),
    ])
}
