use serde::{Deserialize, Serialize};

/// Search result wire format.
///
/// Field names are camelCase on the wire; `directAncestor` is `null`
/// whenever `found` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub found: bool,
    #[serde(rename = "directAncestor")]
    pub direct_ancestor: Option<String>,
}

/// Error body for validation and upstream failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_wire_shape() {
        let found = SearchResponse {
            found: true,
            direct_ancestor: Some("Dog".to_string()),
        };
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json, serde_json::json!({"found": true, "directAncestor": "Dog"}));

        let missed = SearchResponse {
            found: false,
            direct_ancestor: None,
        };
        let json = serde_json::to_value(&missed).unwrap();
        assert_eq!(json, serde_json::json!({"found": false, "directAncestor": null}));
    }
}
