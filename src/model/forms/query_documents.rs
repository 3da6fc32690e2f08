use serde::Serialize;

#[derive(Serialize)]
pub struct QueryDocuments {
    pub filter: String,
    pub count: u64,
    #[serde(rename = "return")]
    pub return_fields: String,
}

impl QueryDocuments {
    pub fn sha1_prefix(prefix: &str, count: u64) -> Self {
        QueryDocuments {
            filter: format!("extracted_metadata.sha1::{}*", prefix),
            count,
            return_fields: "extracted_metadata.sha1".into(),
        }
    }
}
