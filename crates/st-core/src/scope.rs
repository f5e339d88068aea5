use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub const UNIVERSE_PATH: &str = "";

pub const PRIVATE_MARKER: &str = "internal";
const VENDOR_SEGMENT: &str = "vendor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub path: String,
    pub visibility: ScopeVisibility,
}

impl ScopeConfig {
    pub fn universe() -> Self {
        Self::public(UNIVERSE_PATH)
    }

    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            visibility: ScopeVisibility::Public,
        }
    }

    pub fn private(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            visibility: ScopeVisibility::Private,
        }
    }

    pub fn inferred(path: impl Into<String>) -> Self {
        let path = path.into();
        let private = path.contains(PRIVATE_MARKER)
            || path.split('/').any(|segment| segment == VENDOR_SEGMENT);
        Self {
            path,
            visibility: if private {
                ScopeVisibility::Private
            } else {
                ScopeVisibility::Public
            },
        }
    }

    pub fn is_universe(&self) -> bool {
        self.path == UNIVERSE_PATH
    }

    pub fn is_private(&self) -> bool {
        self.visibility == ScopeVisibility::Private
    }
}

// Shorter paths first, equal lengths lexically. When two scopes expose the
// same shape, the one that sorts first owns it.
pub fn compare_scope_paths(left: &str, right: &str) -> Ordering {
    left.len()
        .cmp(&right.len())
        .then_with(|| left.cmp(right))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOrder {
    scopes: Vec<ScopeConfig>,
}

impl ScopeOrder {
    pub fn new(mut scopes: Vec<ScopeConfig>) -> Self {
        scopes.sort_by(|left, right| compare_scope_paths(&left.path, &right.path));
        scopes.dedup_by(|later, earlier| later.path == earlier.path);
        Self { scopes }
    }

    pub fn scopes(&self) -> &[ScopeConfig] {
        &self.scopes
    }

    pub fn paths(&self) -> Vec<String> {
        self.scopes.iter().map(|scope| scope.path.clone()).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.scopes
            .binary_search_by(|scope| compare_scope_paths(&scope.path, path))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

pub fn qualified_name(path: &str, name: &str) -> String {
    if path == UNIVERSE_PATH {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

// Declaration names never contain a dot.
pub fn owning_scope_path(qualified: &str) -> &str {
    match qualified.rsplit_once('.') {
        Some((path, _)) => path,
        None => UNIVERSE_PATH,
    }
}

#[cfg(test)]
mod scope_tests {
    use super::*;

    #[test]
    fn shorter_paths_sort_first_then_lexically() {
        assert_eq!(compare_scope_paths("io", "bytes"), Ordering::Less);
        assert_eq!(compare_scope_paths("", "io"), Ordering::Less);
        assert_eq!(compare_scope_paths("os", "io"), Ordering::Greater);
        assert_eq!(compare_scope_paths("io", "io"), Ordering::Equal);
    }

    #[test]
    fn scope_order_sorts_and_drops_duplicate_paths() {
        let order = ScopeOrder::new(vec![
            ScopeConfig::public("net/http"),
            ScopeConfig::public("bytes"),
            ScopeConfig::private("io"),
            ScopeConfig::public("io"),
            ScopeConfig::universe(),
        ]);
        assert_eq!(order.paths(), vec!["", "io", "bytes", "net/http"]);
        assert!(order.scopes()[1].is_private());
        assert!(order.contains("bytes"));
        assert!(!order.contains("strings"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn inferred_visibility_matches_internal_marker_and_vendor_segment() {
        assert!(ScopeConfig::inferred("io/internal").is_private());
        assert!(ScopeConfig::inferred("internal/poll").is_private());
        assert!(ScopeConfig::inferred("net/internalize").is_private());
        assert!(ScopeConfig::inferred("cmd/vendor/golang.org/x/mod").is_private());
        assert!(!ScopeConfig::inferred("vendorlib").is_private());
        assert!(!ScopeConfig::inferred("").is_private());
    }

    #[test]
    fn qualified_names_round_trip_to_owning_path() {
        assert_eq!(qualified_name("", "error"), "error");
        assert_eq!(qualified_name("net/http", "Handler"), "net/http.Handler");
        assert_eq!(owning_scope_path("net/http.Handler"), "net/http");
        assert_eq!(owning_scope_path("gopkg.in/yaml.v2.Marshaler"), "gopkg.in/yaml.v2");
        assert_eq!(owning_scope_path("error"), "");
    }

    #[test]
    fn visibility_serializes_in_snake_case() {
        let json = serde_json::to_string(&ScopeConfig::private("io/internal")).expect("json");
        assert_eq!(json, r#"{"path":"io/internal","visibility":"private"}"#);
    }
}
