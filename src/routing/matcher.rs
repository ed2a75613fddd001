//! Route normalization and blog post matching.
//!
//! # Responsibilities
//! - Strip query string, fragment and trailing slashes from a request path
//! - Match the `/blog/posts/<slug>` pattern
//! - Reject slugs that could escape the template root
//!
//! # Design Decisions
//! - Slugs are taken verbatim (no percent-decoding), so an encoded separator
//!   stays a literal filename character
//! - No regex; plain prefix checks

/// Prefix under which blog posts are served.
pub const BLOG_POSTS_PREFIX: &str = "/blog/posts";

/// Outcome of matching a route against the blog post pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogMatch<'a> {
    /// Route is not under the blog posts prefix.
    NotBlog,
    /// Prefix matched with an empty slug.
    Index,
    /// Prefix matched with a usable slug.
    Post(&'a str),
    /// Slug contains a traversal or separator token.
    Rejected,
}

/// Normalize a raw request target into a route.
///
/// Query string and fragment are dropped; trailing slashes are stripped from
/// every path except the root.
pub fn normalize_route(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = &raw[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Match a normalized route against `/blog/posts/<slug>`.
pub fn match_blog_post(route: &str) -> BlogMatch<'_> {
    let Some(rest) = route.strip_prefix(BLOG_POSTS_PREFIX) else {
        return BlogMatch::NotBlog;
    };
    let slug = if rest.is_empty() {
        rest
    } else if let Some(slug) = rest.strip_prefix('/') {
        slug
    } else {
        // e.g. "/blog/postscript"
        return BlogMatch::NotBlog;
    };

    if slug.is_empty() {
        BlogMatch::Index
    } else if is_safe_slug(slug) {
        BlogMatch::Post(slug)
    } else {
        BlogMatch::Rejected
    }
}

/// A slug is safe when it cannot name anything outside `blog/posts/`.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.contains("..") && !slug.contains(['/', '\\', '\0'])
}
