pub mod iam_token;
pub mod query_documents;
