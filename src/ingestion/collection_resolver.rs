use tracing::info;

use crate::{
    model::{
        cli_error::CliError,
        resource_id::{CollectionRef, ResourceId},
    },
    services::discovery::DiscoveryService,
};

/// Work out which collection to ingest into.
///
/// Explicit ids win. Otherwise the environment is the first writable one and
/// the collection is the only one in it; none or several is an error.
pub async fn resolve_collection(
    service: &impl DiscoveryService,
    environment_id: Option<&str>,
    collection_id: Option<&str>,
) -> Result<CollectionRef, CliError> {
    let environment_id = match environment_id {
        Some(id) => ResourceId::parse("environment", id)?,
        None => {
            let environments = service.list_environments().await?;
            let writable = environments
                .into_iter()
                .find(|e| !e.read_only)
                .ok_or(CliError::NoWritableEnvironment)?;
            info!(environment_id = %writable.environment_id, name = %writable.name, "Using writable environment");
            ResourceId::parse("environment", &writable.environment_id)?
        }
    };

    let collection_id = match collection_id {
        Some(id) => ResourceId::parse("collection", id)?,
        None => {
            let mut collections = service.list_collections(&environment_id).await?;
            match collections.len() {
                0 => return Err(CliError::NoCollection),
                1 => {
                    let collection = collections.remove(0);
                    info!(collection_id = %collection.collection_id, name = %collection.name, "Using the only collection");
                    ResourceId::parse("collection", &collection.collection_id)?
                }
                n => return Err(CliError::MultipleCollections(n)),
            }
        }
    };

    Ok(CollectionRef {
        environment_id,
        collection_id,
    })
}
