use common::error::AppError;
use tracing::info;

use crate::backend::FileSearchBackend;

/// Find an existing store by display name or create one.
///
/// The display name is a lookup key only: the service does not enforce
/// uniqueness, so the first listed match wins. No result is cached; every
/// call re-queries the service.
pub async fn resolve_or_create_store(
    backend: &dyn FileSearchBackend,
    display_name: &str,
) -> Result<String, AppError> {
    if display_name.trim().is_empty() {
        return Err(AppError::Validation(
            "store display name must not be empty".to_string(),
        ));
    }

    let stores = backend.list_stores().await?;
    if let Some(existing) = stores
        .iter()
        .find(|store| store.display_name == display_name)
    {
        info!(store = %existing.name, display_name, "using existing store");
        return Ok(existing.name.clone());
    }

    let created = backend.create_store(display_name).await?;
    info!(store = %created.name, display_name, "created new store");
    Ok(created.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    #[tokio::test]
    async fn returns_existing_store_without_creating() {
        let backend = MockBackend::default().with_store("fileSearchStores/existing", "notes");

        let resolved = resolve_or_create_store(&backend, "notes")
            .await
            .expect("resolve");

        assert_eq!(resolved, "fileSearchStores/existing");
        assert_eq!(backend.call_count("create_store").await, 0);
    }

    #[tokio::test]
    async fn creates_store_when_missing() {
        let backend = MockBackend::default();

        let resolved = resolve_or_create_store(&backend, "notes")
            .await
            .expect("resolve");

        assert_eq!(backend.call_count("create_store").await, 1);
        let stores = backend.stores.lock().await;
        assert_eq!(stores.len(), 1);
        assert_eq!(stores.first().map(|s| s.name.as_str()), Some(resolved.as_str()));
    }

    #[tokio::test]
    async fn second_call_reuses_created_store() {
        let backend = MockBackend::default();

        let first = resolve_or_create_store(&backend, "notes")
            .await
            .expect("first resolve");
        let second = resolve_or_create_store(&backend, "notes")
            .await
            .expect("second resolve");

        assert_eq!(first, second);
        assert_eq!(backend.call_count("create_store").await, 1);
        assert_eq!(backend.call_count("list_stores").await, 2);
    }

    #[tokio::test]
    async fn first_display_name_match_wins() {
        let backend = MockBackend::default()
            .with_store("fileSearchStores/one", "notes")
            .with_store("fileSearchStores/two", "notes");

        let resolved = resolve_or_create_store(&backend, "notes")
            .await
            .expect("resolve");

        assert_eq!(resolved, "fileSearchStores/one");
    }

    #[tokio::test]
    async fn empty_display_name_is_rejected_before_any_call() {
        let backend = MockBackend::default();

        let result = resolve_or_create_store(&backend, "  ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(backend.call_count("list_stores").await, 0);
    }

    #[tokio::test]
    async fn listing_failure_surfaces_as_store_lookup() {
        let backend = MockBackend::default().with_list_error("upstream unavailable");

        let result = resolve_or_create_store(&backend, "notes").await;

        assert!(matches!(result, Err(AppError::StoreLookup(_))));
    }
}
