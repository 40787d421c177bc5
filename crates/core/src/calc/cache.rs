//! Calculation result caching using Moka.
//!
//! Aggregates are keyed by `(project_id, revision, write_id)`. Every successful write
//! bumps the revision and stamps a fresh write ID, so a stale entry can never be served
//! for a newer snapshot, nor for a sibling written from the same parent. Old entries
//! simply age out.

use moka::sync::Cache;
use siteledger_shared::CacheConfig;
use siteledger_shared::types::ProjectId;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::engine::CalcEngine;
use super::types::Aggregates;
use crate::project::Project;

type CacheKey = (ProjectId, u64, Uuid);

fn key(project: &Project) -> CacheKey {
    (project.id, project.revision, project.write_id)
}

/// Cache for calculation results.
///
/// Thread-safe and cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct CalcCache {
    cache: Cache<CacheKey, Arc<Aggregates>>,
}

impl CalcCache {
    /// Creates a new cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Creates a new cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns the aggregates for a snapshot, computing them on a miss.
    #[must_use]
    pub fn calc(&self, project: &Project) -> Arc<Aggregates> {
        self.cache
            .get_with(key(project), || {
                Arc::new(CalcEngine::calc(project))
            })
    }

    /// Returns true if aggregates for this exact snapshot are cached.
    #[must_use]
    pub fn contains(&self, project: &Project) -> bool {
        self.cache.contains_key(&key(project))
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for CalcCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{NewScopeItem, ProjectService};
    use rust_decimal_macros::dec;
    use siteledger_shared::ProjectDefaults;

    fn project() -> Project {
        let project = Project::new("Garage", &ProjectDefaults::default());
        ProjectService::add_scope_item(
            &project,
            NewScopeItem {
                category: "Slab".to_string(),
                description: "Pour slab".to_string(),
                unit: "m2".to_string(),
                rate: dec!(150),
                qty: dec!(36),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = CalcCache::new();
        let project = project();

        assert!(!cache.contains(&project));
        let first = cache.calc(&project);
        assert!(cache.contains(&project));
        let second = cache.calc(&project);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.subtotal, dec!(5400));
    }

    #[test]
    fn test_new_revision_is_a_miss() {
        let cache = CalcCache::new();
        let project = project();
        let before = cache.calc(&project);

        let edited = ProjectService::set_markup(&project, dec!(30), dec!(0)).unwrap();
        assert!(!cache.contains(&edited));
        let after = cache.calc(&edited);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.revision, edited.revision);
        assert_ne!(before.margin_amount, after.margin_amount);
    }

    #[test]
    fn test_sibling_writes_do_not_share_entries() {
        let cache = CalcCache::new();
        let base = project();
        let generous = ProjectService::set_markup(&base, dec!(30), dec!(5)).unwrap();
        let lean = ProjectService::set_markup(&base, dec!(10), dec!(5)).unwrap();
        assert_eq!(generous.revision, lean.revision);

        let first = cache.calc(&generous);
        assert!(!cache.contains(&lean));
        let second = cache.calc(&lean);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*second, CalcEngine::calc(&lean));
        assert_eq!(second.margin_amount, dec!(540));
        assert_eq!(first.margin_amount, dec!(1620));
    }

    #[test]
    fn test_cached_matches_direct() {
        let cache = CalcCache::new();
        let project = project();
        assert_eq!(*cache.calc(&project), CalcEngine::calc(&project));
    }

    #[test]
    fn test_invalidate_all() {
        let cache = CalcCache::from_config(&CacheConfig {
            capacity: 10,
            ttl_secs: 60,
        });
        let project = project();
        let _ = cache.calc(&project);

        cache.invalidate_all();
        cache.run_pending_tasks();

        assert!(!cache.contains(&project));
        assert_eq!(cache.entry_count(), 0);
    }
}
