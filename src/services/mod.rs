pub mod discovery;
pub mod discovery_api;
pub mod iam;
