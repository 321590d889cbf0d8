use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::models::NewProject;

pub const MISSING_FIELDS: &str = "Missing name or slug or domain";
pub const SLUG_SHAPE_ERROR: &str = "Slug cannot contain spaces or periods";
pub const SLUG_RESERVED_ERROR: &str = "Cannot use reserved slugs";
pub const DOMAIN_INVALID_ERROR: &str = "Invalid domain";

/// Paths the platform serves itself on every link domain.
const RESERVED_KEYS: &[&str] = &[
    "about", "admin", "api", "app", "blog", "careers", "changelog", "contact", "dashboard",
    "docs", "features", "help", "links", "metatags", "pricing", "privacy", "projects",
    "settings", "stats", "static", "terms",
];

/// Short links every domain answers with a built-in redirect.
const DEFAULT_REDIRECT_KEYS: &[&str] = &[
    "home", "signin", "login", "register", "signup", "welcome", "discord", "github", "twitter",
    "tags",
];

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .unwrap()
});

/// Raw create request. Fields are optional so absence is reported as a 422, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingField,
    Invalid {
        slug_error: Option<String>,
        domain_error: Option<String>,
    },
}

/// Immutable slug and domain rules, built once at startup.
#[derive(Debug, Clone)]
pub struct ProjectPolicy {
    reserved_keys: HashSet<String>,
    default_redirect_keys: HashSet<String>,
    root_domain: String,
}

impl ProjectPolicy {
    pub fn new(root_domain: &str, extra_reserved: &[String]) -> Self {
        let reserved_keys = RESERVED_KEYS
            .iter()
            .map(|k| k.to_string())
            .chain(extra_reserved.iter().cloned())
            .collect();
        let default_redirect_keys = DEFAULT_REDIRECT_KEYS.iter().map(|k| k.to_string()).collect();

        Self {
            reserved_keys,
            default_redirect_keys,
            root_domain: root_domain.to_lowercase(),
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn is_reserved_slug(&self, slug: &str) -> bool {
        self.reserved_keys.contains(slug) || self.default_redirect_keys.contains(slug)
    }

    fn slug_error(&self, slug: &str) -> Option<String> {
        if slug.contains(' ') || slug.contains('.') {
            Some(SLUG_SHAPE_ERROR.to_string())
        } else if self.is_reserved_slug(slug) {
            Some(SLUG_RESERVED_ERROR.to_string())
        } else {
            None
        }
    }

    /// Syntactically a hostname and not the platform's own domain or a subdomain of it.
    /// Expects a lowercased domain.
    pub fn is_valid_domain(&self, domain: &str) -> bool {
        if domain.len() > 253 || !DOMAIN_RE.is_match(domain) {
            return false;
        }
        let under_root = domain == self.root_domain
            || domain
                .strip_suffix(self.root_domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));
        !under_root
    }

    /// Check a create request. Presence is checked first and alone; after that
    /// the slug and domain are both checked so both errors can be reported.
    pub fn validate(&self, input: &ProjectInput) -> Result<NewProject, ValidationError> {
        let (Some(name), Some(slug), Some(domain)) =
            (present(&input.name), present(&input.slug), present(&input.domain))
        else {
            return Err(ValidationError::MissingField);
        };

        let domain = domain.to_lowercase();
        let slug_error = self.slug_error(slug);
        let domain_error = (!self.is_valid_domain(&domain)).then(|| DOMAIN_INVALID_ERROR.to_string());

        if slug_error.is_some() || domain_error.is_some() {
            return Err(ValidationError::Invalid {
                slug_error,
                domain_error,
            });
        }

        Ok(NewProject {
            name: name.to_string(),
            slug: slug.to_string(),
            domain,
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
