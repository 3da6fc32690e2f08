use serde::{Deserialize, Serialize};

/// One page of a query over a collection, reduced to the fields we ask for.
#[derive(Debug, Default, Deserialize)]
pub struct QueryResp {
    pub matching_results: u64,
    #[serde(default)]
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    pub extracted_metadata: Option<ExtractedMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractedMetadata {
    pub sha1: Option<String>,
}

impl QueryResp {
    pub fn sha1s(self) -> impl Iterator<Item = String> {
        self.results
            .into_iter()
            .filter_map(|r| r.extracted_metadata.and_then(|m| m.sha1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAccepted {
    pub document_id: String,
    pub status: String,
}

/// Error body returned by Discovery, e.g. `{"code": 400, "error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1s_skip_results_without_metadata() {
        let resp: QueryResp = serde_json::from_str(
            r#"{
                "matching_results": 3,
                "results": [
                    {"id": "a", "extracted_metadata": {"sha1": "aa"}},
                    {"id": "b"},
                    {"id": "c", "extracted_metadata": {"filename": "c.pdf"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(resp.sha1s().collect::<Vec<_>>(), vec!["aa".to_string()]);
    }

    #[test]
    fn error_body_tolerates_missing_fields() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error": "bad"}"#).unwrap();
        assert_eq!(body.code, None);
        assert_eq!(body.error.as_deref(), Some("bad"));
    }
}
