//! Meilisearch wire types and key scopes

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wildcard granting every index or action
pub const WILDCARD: &str = "*";

/// Set of indexes or actions a key covers
///
/// Any `*` entry collapses the whole scope to [`Scope::All`]. Entries are
/// trimmed and blanks are dropped, so `"a, b,,"` and `["a", " b"]` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum Scope {
    All,
    Only(BTreeSet<String>),
}

impl Scope {
    /// Parse a comma-separated list (`API_KEY_INDEXES`, `API_KEY_ACTIONS`)
    pub fn parse_list(input: &str) -> Self {
        Self::from_items(input.split(','))
    }

    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for item in items {
            let item = item.as_ref().trim();
            if item == WILDCARD {
                return Scope::All;
            }
            if !item.is_empty() {
                set.insert(item.to_string());
            }
        }
        Scope::Only(set)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scope::Only(set) if set.is_empty())
    }

    /// Whether a key granted `self` covers everything in `requested`
    pub fn covers(&self, requested: &Scope) -> bool {
        match (self, requested) {
            (Scope::All, _) => true,
            (Scope::Only(_), Scope::All) => false,
            (Scope::Only(granted), Scope::Only(wanted)) => wanted.is_subset(granted),
        }
    }

    /// Explicit entries, empty for [`Scope::All`]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let set = match self {
            Scope::All => None,
            Scope::Only(set) => Some(set),
        };
        set.into_iter().flatten().map(String::as_str)
    }

    /// Wire form, `["*"]` for [`Scope::All`]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Scope::All => vec![WILDCARD.to_string()],
            Scope::Only(set) => set.iter().cloned().collect(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Only(BTreeSet::new())
    }
}

impl From<Vec<String>> for Scope {
    fn from(items: Vec<String>) -> Self {
        Scope::from_items(items)
    }
}

impl From<Scope> for Vec<String> {
    fn from(scope: Scope) -> Self {
        scope.to_vec()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_vec().join(","))
    }
}

/// API key as returned by `GET /keys` and `GET /keys/{key}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Scope,
    #[serde(default)]
    pub indexes: Scope,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Name, falling back to the description
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.description.as_deref())
    }

    /// Key value, if present and non-empty
    pub fn value(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// `GET /keys` body, either paginated or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum KeyListing {
    Page {
        results: Vec<ApiKey>,
        #[serde(default)]
        total: Option<usize>,
    },
    Plain(Vec<ApiKey>),
}

/// `POST /keys` body
///
/// `expiresAt` is always sent; `null` means the key never expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCreate {
    pub name: String,
    pub description: String,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    pub expires_at: Option<String>,
}

/// What the provisioner needs a key for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    /// Human description, also the match target for reuse
    pub description: String,
    /// Name given to newly created keys, unique per namespace and secret
    pub name: String,
    pub indexes: Scope,
    pub actions: Scope,
}

impl KeyRequest {
    pub fn to_create(&self) -> KeyCreate {
        KeyCreate {
            name: self.name.clone(),
            description: self.description.clone(),
            actions: self.actions.to_vec(),
            indexes: self.indexes.to_vec(),
            expires_at: None,
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

/// Asynchronous task summary returned by write endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskInfo {
    #[serde(alias = "uid")]
    pub task_uid: u64,
}

/// `GET /tasks/{uid}` body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Task {
    pub status: String,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// Error body of any failed request or task
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scope_parse_list() {
        assert_eq!(Scope::parse_list("*"), Scope::All);
        assert_eq!(Scope::parse_list("movies, *"), Scope::All);
        assert_eq!(
            Scope::parse_list(" movies,books,, "),
            Scope::from_items(["books", "movies"])
        );
        assert!(Scope::parse_list(" , ").is_empty());
    }

    #[test]
    fn test_scope_covers() {
        let all = Scope::All;
        let ab = Scope::parse_list("a,b");
        let a = Scope::parse_list("a");

        assert!(all.covers(&all));
        assert!(all.covers(&ab));
        assert!(ab.covers(&a));
        assert!(ab.covers(&ab));
        assert!(!a.covers(&ab));
        assert!(!ab.covers(&all));
        // An empty grant covers nothing but an empty request
        assert!(!Scope::default().covers(&a));
    }

    #[test]
    fn test_scope_wire_form() {
        assert_eq!(Scope::All.to_vec(), vec!["*"]);
        assert_eq!(Scope::parse_list("b,a").to_string(), "a,b");

        let scope: Scope = serde_json::from_str(r#"["* "]"#).unwrap();
        assert_eq!(scope, Scope::All);
        assert_eq!(serde_json::to_string(&Scope::All).unwrap(), r#"["*"]"#);
    }

    #[test]
    fn test_api_key_deserialize() {
        let json = r#"{
            "name": null,
            "description": "Search key",
            "key": "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4",
            "uid": "6062abda-a5aa-4414-ac91-ecd7944c0f8d",
            "actions": ["search"],
            "indexes": ["products"],
            "expiresAt": "2021-11-13T00:00:00Z",
            "createdAt": "2021-11-12T10:00:00Z",
            "updatedAt": "2021-11-12T10:00:00Z"
        }"#;
        let key: ApiKey = serde_json::from_str(json).unwrap();
        assert_eq!(key.label(), Some("Search key"));
        assert_eq!(key.actions, Scope::from_items(["search"]));
        assert!(key.is_expired(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()));
        assert!(!key.is_expired(Utc.with_ymd_and_hms(2021, 11, 12, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_key_listing_shapes() {
        let page: KeyListing =
            serde_json::from_str(r#"{"results":[{"key":"k1"}],"offset":0,"limit":20,"total":1}"#)
                .unwrap();
        assert!(matches!(page, KeyListing::Page { ref results, total: Some(1) } if results.len() == 1));

        let plain: KeyListing = serde_json::from_str(r#"[{"key":"k1"},{"key":"k2"}]"#).unwrap();
        assert!(matches!(plain, KeyListing::Plain(ref keys) if keys.len() == 2));
    }

    #[test]
    fn test_key_create_sends_null_expiry() {
        let request = KeyRequest {
            description: "Provisioned API Key".into(),
            name: "Provisioned API Key (search/meili-key)".into(),
            indexes: Scope::All,
            actions: Scope::parse_list("search,documents.get"),
        };
        let body = serde_json::to_value(request.to_create()).unwrap();
        assert_eq!(body["expiresAt"], serde_json::Value::Null);
        assert_eq!(body["indexes"], serde_json::json!(["*"]));
        assert_eq!(body["actions"], serde_json::json!(["documents.get", "search"]));
    }
}
