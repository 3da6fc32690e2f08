use std::collections::{HashSet, VecDeque};

use futures::future::join_all;
use tracing::{debug, info};

use crate::{
    model::{cli_error::CliError, resource_id::CollectionRef},
    services::discovery::DiscoveryService,
};

/// Discovery caps a query at this many results.
pub const QUERY_PAGE_SIZE: u64 = 10_000;

const HEX_DIGITS: &str = "0123456789abcdef";
const SHA1_HEX_LEN: usize = 40;

/// Every `extracted_metadata.sha1` in the collection.
///
/// A single query can't return them all, so the hash space is split by hex
/// prefix. Any prefix matching more than a page is split again into its
/// sixteen children until every page fits.
pub async fn existing_sha1s(
    service: &impl DiscoveryService,
    collection: &CollectionRef,
    page_size: u64,
) -> Result<HashSet<String>, CliError> {
    let mut sha1s = HashSet::new();
    let mut prefixes = VecDeque::from([String::new()]);
    let mut queries = 0usize;

    while let Some(prefix) = prefixes.pop_front() {
        let children: Vec<String> = HEX_DIGITS
            .chars()
            .map(|digit| format!("{}{}", prefix, digit))
            .collect();

        let pages = join_all(
            children
                .iter()
                .map(|child| service.query_sha1_prefix(collection, child, page_size)),
        )
        .await;
        queries += children.len();

        for (child, page) in children.into_iter().zip(pages) {
            let page = page?;
            if page.matching_results > page_size && child.len() < SHA1_HEX_LEN {
                debug!(prefix = %child, matching = page.matching_results, "Splitting prefix");
                prefixes.push_back(child);
            } else {
                sha1s.extend(page.sha1s().map(|s| s.to_ascii_lowercase()));
            }
        }
    }

    info!(documents = sha1s.len(), queries, "Listed existing documents");
    Ok(sha1s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::fake::{collection, FakeDiscovery};

    fn sha1_like(n: usize) -> String {
        format!("{:040x}", n)
    }

    #[tokio::test]
    async fn empty_collection_takes_one_round() {
        let service = FakeDiscovery::new(vec!["coll"]);

        let sha1s = existing_sha1s(&service, &collection(), QUERY_PAGE_SIZE)
            .await
            .unwrap();

        assert!(sha1s.is_empty());
        assert_eq!(service.queries(), 16);
    }

    #[tokio::test]
    async fn crowded_prefixes_are_split() {
        // All of these start with "00000...", so the first few levels overflow.
        let stored: Vec<String> = (0..20).map(sha1_like).collect();
        let service = FakeDiscovery::new(vec!["coll"]).with_sha1s(stored.iter().cloned());

        let sha1s = existing_sha1s(&service, &collection(), 5).await.unwrap();

        assert_eq!(sha1s.len(), 20);
        assert!(stored.iter().all(|s| sha1s.contains(s)));
        assert!(service.queries() > 16);
    }

    #[tokio::test]
    async fn upper_case_hashes_are_normalised() {
        let service = FakeDiscovery::new(vec!["coll"])
            .with_sha1s(["A9993E364706816ABA3E25717850C26C9CD0D89D".to_string()]);

        let sha1s = existing_sha1s(&service, &collection(), QUERY_PAGE_SIZE)
            .await
            .unwrap();

        assert!(sha1s.contains("a9993e364706816aba3e25717850c26c9cd0d89d"));
    }
}
