//! In-memory Discovery for tests.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    model::{
        cli_error::CliError,
        collection::{Collection, Environment},
        document::{DocumentAccepted, ExtractedMetadata, QueryResp, QueryResult},
        file_entry::FileEntry,
        resource_id::{CollectionRef, ResourceId},
    },
    services::discovery::{DiscoveryService, SubmitError},
};

pub fn collection() -> CollectionRef {
    CollectionRef {
        environment_id: ResourceId::parse("environment", "writable-env").unwrap(),
        collection_id: ResourceId::parse("collection", "coll").unwrap(),
    }
}

/// What to do when a file with a given name is submitted.
#[derive(Debug, Clone)]
pub enum Script {
    Reject(u16),
    Transport,
    /// Answer 429 this many times, then accept.
    RateLimit(u32),
}

pub struct FakeDiscovery {
    collections: Vec<String>,
    documents: Mutex<BTreeSet<String>>,
    scripts: Mutex<HashMap<String, Script>>,
    lookups: AtomicUsize,
    queries: AtomicUsize,
    submissions: AtomicUsize,
}

impl FakeDiscovery {
    pub fn new(collections: Vec<&str>) -> Self {
        FakeDiscovery {
            collections: collections.into_iter().map(String::from).collect(),
            documents: Mutex::new(BTreeSet::new()),
            scripts: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    pub fn with_sha1s(self, sha1s: impl IntoIterator<Item = String>) -> Self {
        self.documents.lock().unwrap().extend(sha1s);
        self
    }

    pub fn script(self, file_name: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(file_name.to_owned(), script);
        self
    }

    pub fn contains(&self, sha1: &str) -> bool {
        self.documents.lock().unwrap().contains(sha1)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.lookups.store(0, Ordering::SeqCst);
        self.queries.store(0, Ordering::SeqCst);
        self.submissions.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl DiscoveryService for FakeDiscovery {
    async fn list_environments(&self) -> Result<Vec<Environment>, CliError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            Environment {
                environment_id: "system".into(),
                name: "Watson System Environment".into(),
                read_only: true,
            },
            Environment {
                environment_id: "writable-env".into(),
                name: "byod".into(),
                read_only: false,
            },
        ])
    }

    async fn list_collections(
        &self,
        _environment_id: &ResourceId,
    ) -> Result<Vec<Collection>, CliError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .collections
            .iter()
            .map(|id| Collection {
                collection_id: id.clone(),
                name: format!("{} docs", id),
                status: Some("active".into()),
            })
            .collect())
    }

    async fn query_sha1_prefix(
        &self,
        _collection: &CollectionRef,
        prefix: &str,
        count: u64,
    ) -> Result<QueryResp, CliError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents.lock().unwrap();
        let matching: Vec<&String> = documents
            .iter()
            .filter(|sha1| sha1.to_ascii_lowercase().starts_with(prefix))
            .collect();

        Ok(QueryResp {
            matching_results: matching.len() as u64,
            results: matching
                .into_iter()
                .take(count as usize)
                .map(|sha1| QueryResult {
                    extracted_metadata: Some(ExtractedMetadata {
                        sha1: Some(sha1.clone()),
                    }),
                })
                .collect(),
        })
    }

    async fn update_document(
        &self,
        _collection: &CollectionRef,
        document_id: &str,
        file: &FileEntry,
    ) -> Result<DocumentAccepted, SubmitError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&file.file_name()) {
                Some(Script::Reject(code)) => {
                    return Err(SubmitError::Service {
                        code: *code,
                        message: "Rejected by fake".into(),
                    })
                }
                Some(Script::Transport) => {
                    return Err(SubmitError::Transport("connection refused".into()))
                }
                Some(Script::RateLimit(remaining)) if *remaining > 0 => {
                    *remaining -= 1;
                    return Err(SubmitError::Service {
                        code: 429,
                        message: "Too Many Requests".into(),
                    });
                }
                _ => {}
            }
        }

        self.documents
            .lock()
            .unwrap()
            .insert(document_id.to_owned());

        Ok(DocumentAccepted {
            document_id: document_id.to_owned(),
            status: "processing".into(),
        })
    }
}
