use actix_web::web;
use tokio::time::{interval, Duration};

use crate::AppState;

/// Periodically clears expired reset tokens, revocations, idle limiter
/// entries and stale cache slots.
pub async fn start_maintenance_task(state: web::Data<AppState>) {
    let mut interval = interval(Duration::from_secs(60));

    loop {
        interval.tick().await;

        let (reset_tokens, revocations, limiter_entries) = state.auth_handler.sweep();
        let cache_slots = state.caches.evict_expired();

        if reset_tokens + revocations + limiter_entries + cache_slots > 0 {
            tracing::debug!(reset_tokens, revocations, limiter_entries, cache_slots, "maintenance sweep");
        }
    }
}
