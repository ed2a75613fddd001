//! Route to template resolution.
//!
//! # Responsibilities
//! - Hold the exact route -> template table (built once, immutable)
//! - Resolve blog posts dynamically from the slug
//! - Return an explicit `None` for unknown or rejected routes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap
//! - Configured aliases are validated at startup and cannot claim the blog
//!   posts prefix

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::routing::matcher::{match_blog_post, normalize_route, BlogMatch};
use crate::templates::{TemplateError, TemplateId};

/// Template served for `/blog` and for an empty blog post slug.
pub const BLOG_INDEX_TEMPLATE: &str = "blog/index.html";

/// Built-in route table. Several routes fold into one template.
const BUILTIN_ROUTES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/pricing", "pricing.html"),
    ("/contact", "contact.html"),
    ("/admin", "admin.html"),
    ("/screener", "screener.html"),
    ("/dashboard", "dashboard.html"),
    ("/watchlist", "dashboard.html"),
    ("/account", "dashboard.html"),
    ("/autopilot", "dashboard.html"),
    ("/forecasting", "forecasting.html"),
    ("/indicators", "forecasting.html"),
    ("/trending", "forecasting.html"),
    ("/news", "forecasting.html"),
    ("/options", "forecasting.html"),
    ("/blog", BLOG_INDEX_TEMPLATE),
];

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {0:?} must be an absolute, normalized path")]
    NotNormalized(String),

    #[error("route {0:?} overlaps the blog posts prefix")]
    ShadowsBlogPosts(String),

    #[error("route {route:?}: {source}")]
    Template {
        route: String,
        #[source]
        source: TemplateError,
    },
}

/// Immutable route table.
#[derive(Debug, Clone)]
pub struct TemplateRouter {
    exact: HashMap<String, TemplateId>,
}

impl TemplateRouter {
    /// Router with the built-in table only.
    pub fn new() -> Self {
        let exact = BUILTIN_ROUTES
            .iter()
            .filter_map(|(route, id)| Some(((*route).to_string(), TemplateId::new(*id).ok()?)))
            .collect();
        Self { exact }
    }

    /// Router with the built-in table plus configured aliases.
    ///
    /// Aliases override built-in entries with the same route.
    pub fn with_aliases(aliases: &BTreeMap<String, String>) -> Result<Self, RouteError> {
        let mut router = Self::new();
        for (route, id) in aliases {
            check_alias_route(route)?;
            let id = TemplateId::new(id.as_str()).map_err(|source| RouteError::Template {
                route: route.clone(),
                source,
            })?;
            router.exact.insert(route.clone(), id);
        }
        Ok(router)
    }

    /// Resolve a raw request path to a template identifier.
    pub fn resolve(&self, raw_path: &str) -> Option<TemplateId> {
        let route = normalize_route(raw_path);
        if let Some(id) = self.exact.get(route) {
            return Some(id.clone());
        }

        match match_blog_post(route) {
            BlogMatch::NotBlog => None,
            BlogMatch::Index => TemplateId::new(BLOG_INDEX_TEMPLATE).ok(),
            BlogMatch::Rejected => {
                tracing::debug!(path = %raw_path, "Rejected blog slug with path-escaping tokens");
                None
            }
            BlogMatch::Post(slug) => {
                let file = if slug.ends_with(".html") {
                    slug.to_string()
                } else {
                    format!("{slug}.html")
                };
                TemplateId::new(format!("blog/posts/{file}")).ok()
            }
        }
    }

    /// Number of exact routes.
    pub(crate) fn len(&self) -> usize {
        self.exact.len()
    }
}

impl Default for TemplateRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a configured alias route.
pub fn check_alias_route(route: &str) -> Result<(), RouteError> {
    if !route.starts_with('/') || normalize_route(route) != route {
        return Err(RouteError::NotNormalized(route.to_string()));
    }
    if !matches!(match_blog_post(route), BlogMatch::NotBlog) {
        return Err(RouteError::ShadowsBlogPosts(route.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> Option<String> {
        TemplateRouter::new().resolve(path).map(|id| id.to_string())
    }

    #[test]
    fn test_builtin_routes() {
        for (route, expected) in BUILTIN_ROUTES {
            assert_eq!(resolve(route).as_deref(), Some(*expected), "{route}");
        }
    }

    #[test]
    fn test_alias_sets_fold_into_one_template() {
        for route in ["/dashboard", "/watchlist", "/account", "/autopilot"] {
            assert_eq!(resolve(route).as_deref(), Some("dashboard.html"));
        }
        for route in ["/forecasting", "/indicators", "/trending", "/news", "/options"] {
            assert_eq!(resolve(route).as_deref(), Some("forecasting.html"));
        }
    }

    #[test]
    fn test_trailing_slash_and_query_ignored() {
        assert_eq!(resolve("/dashboard/"), resolve("/dashboard"));
        assert_eq!(resolve("/pricing?plan=pro").as_deref(), Some("pricing.html"));
        assert_eq!(resolve("/?ref=ad").as_deref(), Some("index.html"));
    }

    #[test]
    fn test_unknown_routes_not_found() {
        for route in ["/unknown", "/dashboard/settings", "/index.html", "/blogs", "/Pricing"] {
            assert_eq!(resolve(route), None, "{route}");
        }
    }

    #[test]
    fn test_blog_posts() {
        assert_eq!(resolve("/blog/posts/hello-world").as_deref(), Some("blog/posts/hello-world.html"));
        assert_eq!(resolve("/blog/posts/hello-world.html").as_deref(), Some("blog/posts/hello-world.html"));
        assert_eq!(resolve("/blog/posts/").as_deref(), Some(BLOG_INDEX_TEMPLATE));
        assert_eq!(resolve("/blog/").as_deref(), Some(BLOG_INDEX_TEMPLATE));
    }

    #[test]
    fn test_blog_traversal_not_found() {
        assert_eq!(resolve("/blog/posts/../../etc/passwd"), None);
        assert_eq!(resolve("/blog/posts/..%2f..%2fsecret/x"), None);
        assert_eq!(resolve("/blog/posts/..\\..\\boot.ini"), None);
    }

    #[test]
    fn test_configured_aliases() {
        let mut aliases = BTreeMap::new();
        aliases.insert("/about".to_string(), "contact.html".to_string());
        aliases.insert("/pricing".to_string(), "pricing-v2.html".to_string());
        let router = TemplateRouter::with_aliases(&aliases).unwrap();

        assert_eq!(router.resolve("/about/").unwrap().as_str(), "contact.html");
        assert_eq!(router.resolve("/pricing").unwrap().as_str(), "pricing-v2.html");
        assert_eq!(router.len(), BUILTIN_ROUTES.len() + 1);
    }

    #[test]
    fn test_invalid_aliases_rejected() {
        let cases = [
            ("about", "contact.html"),
            ("/about/", "contact.html"),
            ("/blog/posts/pinned", "contact.html"),
            ("/about", "../contact.html"),
        ];
        for (route, id) in cases {
            let mut aliases = BTreeMap::new();
            aliases.insert(route.to_string(), id.to_string());
            assert!(TemplateRouter::with_aliases(&aliases).is_err(), "{route} -> {id}");
        }
    }
}
