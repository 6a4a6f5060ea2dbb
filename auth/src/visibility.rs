//! Route visibility: which routes may be reached without a token.
//!
//! Visibility is declared at two scopes, a route group and an individual
//! route. Declarations are collected once at startup into a
//! [`VisibilityTable`] and only read afterwards.

use std::collections::HashMap;
use std::fmt;

/// Visibility declared on a route or route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Reachable without authentication
    Public,
    /// Requires a valid bearer token
    Protected,
}

/// Decide whether a route is public.
///
/// A route-level declaration wins over the group-level one in either
/// direction. Without any declaration the route is protected.
pub fn is_public(route: Option<Visibility>, group: Option<Visibility>) -> bool {
    matches!(route.or(group), Some(Visibility::Public))
}

/// Route identity: HTTP method plus the path template it was registered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: String,
    path: String,
}

impl RouteKey {
    pub fn new(method: impl AsRef<str>, path: impl ToString) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    group: String,
    visibility: Option<Visibility>,
}

/// Startup-built lookup of route and group visibility declarations.
#[derive(Debug, Clone, Default)]
pub struct VisibilityTable {
    groups: HashMap<String, Option<Visibility>>,
    routes: HashMap<RouteKey, RouteEntry>,
}

impl VisibilityTable {
    pub fn builder() -> VisibilityTableBuilder {
        VisibilityTableBuilder::default()
    }

    /// Declared visibility of a route itself, if any.
    pub fn route_visibility(&self, route: &RouteKey) -> Option<Visibility> {
        self.routes.get(route).and_then(|entry| entry.visibility)
    }

    /// Declared visibility of the group a route belongs to, if any.
    pub fn group_visibility(&self, route: &RouteKey) -> Option<Visibility> {
        self.routes
            .get(route)
            .and_then(|entry| self.groups.get(&entry.group).copied().flatten())
    }

    /// Whether a request to `route` may skip authentication.
    ///
    /// Unregistered routes are protected.
    pub fn is_public(&self, route: &RouteKey) -> bool {
        is_public(self.route_visibility(route), self.group_visibility(route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects visibility declarations before freezing them into a table.
#[derive(Debug, Default)]
pub struct VisibilityTableBuilder {
    table: VisibilityTable,
}

impl VisibilityTableBuilder {
    /// Declare a route group and its visibility (`None` leaves it unmarked).
    ///
    /// Declaring the same group twice keeps the last declaration.
    pub fn group(mut self, name: impl ToString, visibility: Option<Visibility>) -> Self {
        self.table.groups.insert(name.to_string(), visibility);
        self
    }

    /// Register a route inside a group with its own optional declaration.
    ///
    /// A group that was never declared counts as unmarked.
    pub fn route(
        mut self,
        group: impl ToString,
        route: RouteKey,
        visibility: Option<Visibility>,
    ) -> Self {
        let group = group.to_string();
        self.table.groups.entry(group.clone()).or_insert(None);
        self.table
            .routes
            .insert(route, RouteEntry { group, visibility });
        self
    }

    pub fn build(self) -> VisibilityTable {
        self.table
    }
}
