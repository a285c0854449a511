//! In-memory caching using moka
//!
//! Caches tours, the tour listing and exchange-rate tables. Tours change only
//! through the admin endpoints, which invalidate the affected entries.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::rates::RatesClient;
use crate::tours::{RateTable, TourDefinition};

const LISTING_KEY: &str = "tours:all";

/// Application cache holding tours and rate tables
#[derive(Clone)]
pub struct AppCache {
    /// Tours (id -> TourDefinition)
    pub tours: Cache<Uuid, Arc<TourDefinition>>,
    /// Full tour listing
    pub tour_listing: Cache<String, Arc<Vec<Arc<TourDefinition>>>>,
    /// Rate tables (base currency -> RateTable)
    pub rates: Cache<String, Arc<RateTable>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Tours: 500 entries, 30 min TTL, 10 min idle
            tours: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),

            // Listing: single entry, 10 min TTL
            tour_listing: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),

            // Rates: a handful of base currencies, 1 hour TTL
            rates: Cache::builder()
                .max_capacity(8)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            tours_size: self.tours.entry_count(),
            listing_cached: self.tour_listing.entry_count() > 0,
            rate_tables: self.rates.entry_count(),
        }
    }

    pub async fn listing(&self) -> Option<Arc<Vec<Arc<TourDefinition>>>> {
        self.tour_listing.get(LISTING_KEY).await
    }

    pub async fn set_listing(&self, tours: Vec<Arc<TourDefinition>>) {
        self.tour_listing
            .insert(LISTING_KEY.to_string(), Arc::new(tours))
            .await;
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.tours.invalidate_all();
        self.tour_listing.invalidate_all();
        self.rates.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a tour and the listing that includes it
    pub async fn invalidate_tour(&self, id: Uuid) {
        self.tours.invalidate(&id).await;
        self.tour_listing.invalidate(LISTING_KEY).await;
        info!("Cache invalidated for tour: {}", id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub tours_size: u64,
    pub listing_cached: bool,
    pub rate_tables: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, rates: RatesClient, base_currency: String) {
    // Initial warm-up
    warm_cache(&cache, &db, &rates, &base_currency).await;

    // Periodic refresh every 10 minutes
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db, &rates, &base_currency).await;
    }
}

/// Warm the cache with the tour listing and current rates
async fn warm_cache(cache: &AppCache, db: &PgPool, rates: &RatesClient, base_currency: &str) {
    info!("Starting cache warm-up...");

    match db::list_tours(db).await {
        Ok(tours) => {
            let tours: Vec<Arc<TourDefinition>> = tours.into_iter().map(Arc::new).collect();
            for tour in &tours {
                cache.tours.insert(tour.id, Arc::clone(tour)).await;
            }
            cache.set_listing(tours).await;
        }
        Err(e) => warn!("Failed to warm tour cache: {}", e),
    }

    // Force a fresh table; the old one stays served if the fetch fails.
    match rates.fetch_rates(base_currency).await {
        Ok(table) => {
            cache
                .rates
                .insert(base_currency.to_string(), Arc::new(table))
                .await;
        }
        Err(e) => warn!("Failed to warm rates cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_tour_drops_listing() {
        let cache = AppCache::new();
        let tour = Arc::new(TourDefinition::default());
        cache.tours.insert(tour.id, Arc::clone(&tour)).await;
        cache.set_listing(vec![Arc::clone(&tour)]).await;

        assert!(cache.listing().await.is_some());
        cache.invalidate_tour(tour.id).await;

        assert!(cache.tours.get(&tour.id).await.is_none());
        assert!(cache.listing().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_tour_keeps_other_tours() {
        let cache = AppCache::new();
        let kept = Arc::new(TourDefinition::default());
        let dropped = Arc::new(TourDefinition::default());
        cache.tours.insert(kept.id, Arc::clone(&kept)).await;
        cache.tours.insert(dropped.id, Arc::clone(&dropped)).await;

        cache.invalidate_tour(dropped.id).await;
        assert!(cache.tours.get(&kept.id).await.is_some());
    }

    #[tokio::test]
    async fn test_stats_after_pending_tasks() {
        let cache = AppCache::new();
        let tour = Arc::new(TourDefinition::default());
        cache.tours.insert(tour.id, tour).await;
        cache.tours.run_pending_tasks().await;

        let stats = cache.stats();
        assert_eq!(stats.tours_size, 1);
        assert!(!stats.listing_cached);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_rates() {
        let cache = AppCache::new();
        cache
            .rates
            .insert("USD".to_string(), Arc::new(RateTable::default()))
            .await;

        cache.invalidate_all();
        assert!(cache.rates.get("USD").await.is_none());
    }
}
