//! Route guard: the page routing table plus the pre-navigation access check.
//!
//! DESIGN
//! ======
//! Access is a closed enum, so a route is exactly one of public, guest-only,
//! or authenticated. The decision itself ([`decide`]) is a pure function of
//! the route's access and whether the session holds a token; the only side
//! effect in [`RouteGuard::before_each`] is loading the user for a restored
//! token.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::session::AuthSession;

pub const LOGIN_ROUTE: &str = "login";
pub const HOME_ROUTE: &str = "home";
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Only reachable while logged out (login, register).
    Guest,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub access: RouteAccess,
}

const fn route(name: &'static str, path: &'static str, access: RouteAccess) -> Route {
    Route { name, path, access }
}

/// Children of the `/` layout inherit its `Authenticated` access.
pub const ROUTES: &[Route] = &[
    route(LOGIN_ROUTE, "/login", RouteAccess::Guest),
    route("register", "/register", RouteAccess::Guest),
    route(HOME_ROUTE, "/", RouteAccess::Authenticated),
    route("profile", "/profile", RouteAccess::Authenticated),
    route("reading-rooms", "/reading-rooms", RouteAccess::Authenticated),
    route("readers", "/readers", RouteAccess::Authenticated),
    route("books", "/books", RouteAccess::Authenticated),
    route("assignments", "/assignments", RouteAccess::Authenticated),
    route("librarian", "/librarian", RouteAccess::Authenticated),
    route("queries", "/queries", RouteAccess::Authenticated),
];

/// Find the route for a full path. Matching is case-insensitive and ignores
/// the query string and a trailing slash.
#[must_use]
pub fn resolve(full_path: &str) -> Option<&'static Route> {
    let path = full_path.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    ROUTES.iter().find(|route| route.path == path)
}

#[must_use]
pub fn find_by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

// =============================================================================
// DECISION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub name: &'static str,
    pub query: Vec<(String, String)>,
}

impl Redirect {
    /// Render as a path with an encoded query, e.g. `/login?redirect=%2Freaders`.
    #[must_use]
    pub fn location(&self) -> String {
        let path = find_by_name(self.name).map_or("/", |route| route.path);
        if self.query.is_empty() {
            return path.to_owned();
        }
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.extend_pairs(&self.query);
        format!("{path}?{}", query.finish())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Redirect),
    NotFound,
}

/// One decision per navigation attempt.
#[must_use]
pub fn decide(access: RouteAccess, is_authenticated: bool, full_path: &str) -> Navigation {
    match (access, is_authenticated) {
        (RouteAccess::Authenticated, false) => Navigation::Redirect(Redirect {
            name: LOGIN_ROUTE,
            query: vec![(REDIRECT_PARAM.to_owned(), full_path.to_owned())],
        }),
        (RouteAccess::Guest, true) => Navigation::Redirect(Redirect { name: HOME_ROUTE, query: Vec::new() }),
        _ => Navigation::Proceed,
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check a navigation to `full_path`, loading the user first when a
    /// token was restored without one.
    pub async fn before_each(&self, session: &mut AuthSession, full_path: &str) -> Navigation {
        if session.is_authenticated() && session.user().is_none() {
            if let Err(e) = session.init_user().await {
                tracing::warn!(path = %full_path, error = %e, "navigating without a loaded user");
            }
        }

        let Some(route) = resolve(full_path) else {
            tracing::debug!(path = %full_path, "no route");
            return Navigation::NotFound;
        };
        let navigation = decide(route.access, session.is_authenticated(), full_path);
        tracing::debug!(route = route.name, ?navigation, "navigation decided");
        navigation
    }
}
