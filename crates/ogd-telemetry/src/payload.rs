//! The report shipped to the ingestion endpoint.
//!
//! Wire shape is fixed by the OGD ingestion contract: a `graphql` section with
//! camelCase keys and a `headers` section carrying the originating request's
//! method and reconstructed URL.

use serde::{Deserialize, Serialize};

/// Telemetry report for a single GraphQL operation.
///
/// Built fresh per request, sent as the JSON body of `POST /sdk/graphql`, and
/// discarded. Never persisted, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Operation metadata.
    pub graphql: GraphqlReport,
    /// Originating HTTP context.
    pub headers: OriginHeaders,
}

/// Metadata about the intercepted GraphQL operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlReport {
    /// Content hash of the query, as computed by the host.
    pub query_hash: String,
    /// Raw query source text.
    pub query_source: String,
    /// AST node kind of the parsed operation.
    pub operation_kind: String,
    /// Operation type: `query`, `mutation`, or `subscription`.
    pub operation_type: String,
    /// Operation name.
    pub operation_name: String,
    /// Encoded operation document (`<EMPTY>`, `<FAILED>`, or base64 JSON).
    pub operation_serialized: String,
    /// Encoded request variables.
    pub variables_serialized: String,
    /// Encoded request extensions.
    pub extensions_serialized: String,
}

/// HTTP context of the request the operation arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginHeaders {
    /// Method of the originating request.
    #[serde(rename = "x-original-method")]
    pub original_method: String,
    /// Reconstructed original URL (scheme + host header + original path).
    #[serde(rename = "x-original-url")]
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EMPTY_SENTINEL;
    use serde_json::json;

    fn sample() -> ReportPayload {
        ReportPayload {
            graphql: GraphqlReport {
                query_hash: "deadbeef".into(),
                query_source: "query GetUser { user { id } }".into(),
                operation_kind: "OperationDefinition".into(),
                operation_type: "query".into(),
                operation_name: "GetUser".into(),
                operation_serialized: "b3A=".into(),
                variables_serialized: EMPTY_SENTINEL.into(),
                extensions_serialized: EMPTY_SENTINEL.into(),
            },
            headers: OriginHeaders {
                original_method: "POST".into(),
                original_url: "https://api.example.com/graphql".into(),
            },
        }
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let wire = serde_json::to_value(sample()).unwrap();
        assert_eq!(wire["graphql"]["queryHash"], json!("deadbeef"));
        assert_eq!(wire["graphql"]["operationName"], json!("GetUser"));
        assert_eq!(wire["graphql"]["variablesSerialized"], json!(EMPTY_SENTINEL));
        assert_eq!(wire["headers"]["x-original-method"], json!("POST"));
        assert_eq!(
            wire["headers"]["x-original-url"],
            json!("https://api.example.com/graphql")
        );
    }

    #[test]
    fn test_wire_round_trip() {
        let payload = sample();
        let wire = serde_json::to_string(&payload).unwrap();
        let back: ReportPayload = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, payload);
    }
}
