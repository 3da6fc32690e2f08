use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub environment_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Deserialize)]
pub struct EnvironmentResp {
    pub environments: Vec<Environment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: String,
    #[serde(default)]
    pub name: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CollectionResp {
    pub collections: Vec<Collection>,
}
