//! Route classification.
//!
//! Rules are evaluated in declaration order, first match wins. Anything no
//! rule claims falls through to the table's catch-all policy.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::GatewayError;

/// What a request must present to be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Admitted without looking at any credential.
    Public,
    /// Admitted only when the credential resolves to an identity.
    RequiresAuth,
}

/// Ant-style path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// `/**`: every path.
    Any,
    /// `/base/**`: `/base` itself and everything below it.
    Subtree(String),
    /// A single literal path.
    Exact(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Subtree(base) => match path.strip_prefix(base.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
            PathPattern::Exact(exact) => path == exact,
        }
    }
}

impl FromStr for PathPattern {
    type Err = GatewayError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == "**" || raw == "/**" {
            return Ok(PathPattern::Any);
        }
        if !raw.starts_with('/') {
            return Err(GatewayError::Config(format!(
                "path pattern '{raw}' must start with '/'"
            )));
        }

        let (base, subtree) = match raw.strip_suffix("/**") {
            Some(base) => (base, true),
            None => (raw, false),
        };
        if base.contains('*') {
            return Err(GatewayError::Config(format!(
                "path pattern '{raw}' may only use '**' as its final segment"
            )));
        }
        if !is_normalized(base) {
            return Err(GatewayError::Config(format!(
                "path pattern '{raw}' is not a normalized path"
            )));
        }

        let base = base.trim_end_matches('/');
        Ok(if subtree {
            PathPattern::Subtree(base.to_string())
        } else if base.is_empty() {
            PathPattern::Exact("/".to_string())
        } else {
            PathPattern::Exact(base.to_string())
        })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Any => f.write_str("/**"),
            PathPattern::Subtree(base) => write!(f, "{base}/**"),
            PathPattern::Exact(path) => f.write_str(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub policy: AccessPolicy,
}

impl RouteRule {
    pub fn new(pattern: PathPattern, policy: AccessPolicy) -> Self {
        Self { pattern, policy }
    }
}

/// Ordered rule list plus the catch-all policy.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: AccessPolicy,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>, fallback: AccessPolicy) -> Self {
        Self { rules, fallback }
    }

    /// Public patterns in the given order, every other request authenticated.
    pub fn with_public_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Self, GatewayError> {
        let rules = patterns
            .iter()
            .map(|raw| {
                raw.as_ref()
                    .parse::<PathPattern>()
                    .map(|pattern| RouteRule::new(pattern, AccessPolicy::Public))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, AccessPolicy::RequiresAuth))
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn fallback(&self) -> AccessPolicy {
        self.fallback
    }

    pub fn classify(&self, path: &str) -> AccessPolicy {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map_or(self.fallback, |rule| rule.policy)
    }

    /// Patterns of the public rules, rendered back to their Ant form.
    pub fn public_patterns(&self) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.policy == AccessPolicy::Public)
            .map(|rule| rule.pattern.to_string())
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let public = |base: &str| {
            RouteRule::new(PathPattern::Subtree(base.to_string()), AccessPolicy::Public)
        };
        Self::new(
            vec![public("/actuator"), public("/api/auth"), public("/ws")],
            AccessPolicy::RequiresAuth,
        )
    }
}

/// Whether `path` is absolute and free of dot, empty and encoded-separator
/// segments. A trailing slash is allowed.
pub fn is_normalized(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if path.contains('\\') {
        return false;
    }
    let lowered = path.to_ascii_lowercase();
    if ["%2e", "%2f", "%5c", "%00"]
        .iter()
        .any(|encoded| lowered.contains(encoded))
    {
        return false;
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| match *segment {
        "." | ".." => false,
        "" => i == last,
        _ => true,
    })
}
