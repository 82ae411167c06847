//! Wire types for the Twitter API v2.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Problem type the API reports for an entity that no longer resolves.
pub const ERROR_NOT_FOUND: &str = "https://api.twitter.com/2/problems/resource-not-found";

/// A user object as returned by the v2 API.
///
/// The fields the crawler inspects are typed; everything else the API
/// sends (display fields, counters, `withheld`, ...) is kept in `extra`
/// so the object serializes back to the full snapshot it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Envelope for single-user endpoints.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub data: Option<TwitterUser>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

impl UserResponse {
    /// Whether the response carries the explicit not-found signal.
    pub fn not_found(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.problem_type == ERROR_NOT_FOUND)
    }
}

/// One page of a paginated user listing.
#[derive(Debug, Deserialize)]
pub struct FollowingPage {
    #[serde(default)]
    pub data: Vec<TwitterUser>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct PageMeta {
    pub result_count: u32,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A structured problem entry from the API's `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProblem {
    #[serde(rename = "type")]
    pub problem_type: String,
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_is_an_absence_signal() {
        let body = r#"{
            "errors": [{
                "value": "ghost",
                "detail": "Could not find user with username: [ghost].",
                "title": "Not Found Error",
                "type": "https://api.twitter.com/2/problems/resource-not-found"
            }]
        }"#;

        let resp: UserResponse = serde_json::from_str(body).unwrap();
        assert!(resp.not_found());
        assert!(resp.data.is_none());
    }

    #[test]
    fn user_snapshot_keeps_unmodeled_fields() {
        let body = r#"{
            "id": "2244994945",
            "username": "TwitterDev",
            "protected": false,
            "name": "Twitter Dev",
            "public_metrics": {"followers_count": 512793, "following_count": 2042}
        }"#;

        let user: TwitterUser = serde_json::from_str(body).unwrap();
        assert_eq!(user.id, "2244994945");
        assert!(!user.protected);

        let snapshot = serde_json::to_value(&user).unwrap();
        assert_eq!(snapshot["name"], "Twitter Dev");
        assert_eq!(snapshot["public_metrics"]["followers_count"], 512793);
    }

    #[test]
    fn empty_page_has_no_items_and_no_token() {
        let body = r#"{"meta": {"result_count": 0}}"#;

        let page: FollowingPage = serde_json::from_str(body).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.result_count, 0);
        assert!(page.meta.next_token.is_none());
    }
}
