//! Slug allocation
//!
//! Turns a display name into a unique, URL-safe identifier against a
//! per-entity-type uniqueness index. Collisions are resolved with a fresh
//! random suffix and re-checked, never a monotonic counter: two concurrent
//! creators reading the same "next available" number would race, while
//! independent random tokens stay collision-resistant under contention.

use uuid::Uuid;

use crate::error::DomainError;
use crate::repositories::SlugIndex;

/// Base used when a name normalizes to nothing (e.g. symbols only).
const FALLBACK_BASE: &str = "item";

const SUFFIX_LEN: usize = 6;

/// Normalize a display name into a lowercase, hyphen-separated base slug.
/// Non-alphanumeric runs collapse to a single hyphen; the result carries no
/// leading or trailing hyphen.
pub fn normalize(name: &str) -> String {
    let mut base = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !base.is_empty() {
                base.push('-');
            }
            pending_hyphen = false;
            base.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    base
}

/// Allocate a unique slug for `name`, skipping the entity `exclude` when
/// checking uniqueness (used on update to avoid self-collision).
pub async fn allocate<I>(
    index: &I,
    name: &str,
    exclude: Option<&Uuid>,
) -> Result<String, DomainError>
where
    I: SlugIndex + ?Sized,
{
    let mut base = normalize(name);
    if base.is_empty() {
        base = FALLBACK_BASE.to_string();
    }

    let mut slug = base.clone();
    while index.slug_exists(&slug, exclude).await? {
        let token = Uuid::new_v4().simple().to_string();
        slug = format!("{}-{}", base, &token[..SUFFIX_LEN]);
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct InMemoryIndex {
        taken: Mutex<HashMap<String, Uuid>>,
    }

    impl InMemoryIndex {
        fn new() -> Self {
            Self {
                taken: Mutex::new(HashMap::new()),
            }
        }

        async fn insert(&self, slug: &str, id: Uuid) {
            self.taken.lock().await.insert(slug.to_string(), id);
        }
    }

    #[async_trait]
    impl SlugIndex for InMemoryIndex {
        async fn slug_exists(
            &self,
            slug: &str,
            exclude: Option<&Uuid>,
        ) -> Result<bool, DomainError> {
            let taken = self.taken.lock().await;
            Ok(taken
                .get(slug)
                .map(|owner| Some(owner) != exclude)
                .unwrap_or(false))
        }
    }

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("iPhone"), "iphone");
        assert_eq!(normalize("Gaming Laptop Pro"), "gaming-laptop-pro");
        assert_eq!(normalize("  spaced   out  "), "spaced-out");
        assert_eq!(normalize("50% off!!"), "50-off");
    }

    #[test]
    fn test_normalize_symbols_only_is_empty() {
        assert_eq!(normalize("!!!***"), "");
        assert_eq!(normalize(""), "");
    }

    #[tokio::test]
    async fn test_allocate_free_slug_unchanged() {
        let index = InMemoryIndex::new();
        let slug = allocate(&index, "iPhone", None).await.unwrap();
        assert_eq!(slug, "iphone");
    }

    #[tokio::test]
    async fn test_allocate_collision_appends_suffix() {
        let index = InMemoryIndex::new();
        index.insert("iphone", Uuid::new_v4()).await;

        let slug = allocate(&index, "iPhone", None).await.unwrap();
        assert_ne!(slug, "iphone");
        assert!(slug.starts_with("iphone-"));
        assert_eq!(slug.len(), "iphone-".len() + 6);
    }

    #[tokio::test]
    async fn test_allocate_excludes_self() {
        let index = InMemoryIndex::new();
        let id = Uuid::new_v4();
        index.insert("iphone", id).await;

        // Reallocating for the entity that owns the slug keeps it.
        let slug = allocate(&index, "iPhone", Some(&id)).await.unwrap();
        assert_eq!(slug, "iphone");

        // A different entity still collides.
        let other = Uuid::new_v4();
        let slug = allocate(&index, "iPhone", Some(&other)).await.unwrap();
        assert_ne!(slug, "iphone");
    }

    #[tokio::test]
    async fn test_allocate_symbols_only_falls_back() {
        let index = InMemoryIndex::new();
        let slug = allocate(&index, "!!!", None).await.unwrap();
        assert_eq!(slug, "item");

        index.insert("item", Uuid::new_v4()).await;
        let slug = allocate(&index, "***", None).await.unwrap();
        assert!(slug.starts_with("item-"));
    }
}
