use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;

/// Sliding window counter: the previous window's count is weighted by how
/// much of it still overlaps the current one.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    /// Returns `Err(retry_after_secs)` when the attempt is over the limit.
    fn allow(&mut self, now: Instant) -> Result<(), u64> {
        self.roll(now);
        self.last_seen = now;

        let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
        let window = self.window_size.as_secs_f64();
        let weight = (elapsed / window).min(1.0);
        let effective = (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64);

        if effective < self.limit as f64 {
            self.current_count += 1;
            Ok(())
        } else {
            let remaining = (window - elapsed).ceil() as u64;
            Err(remaining.max(1))
        }
    }
}

/// Per-client login attempt limiter.
#[derive(Clone)]
pub struct LoginLimiter {
    map: Arc<DashMap<String, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl LoginLimiter {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit: limit.max(1),
        }
    }

    pub fn per_minute(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    fn window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let window = self.window(key, now);
        let mut window = window.lock();
        window.allow(now)
    }

    /// Forgets a client, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.map.remove(key);
    }

    /// Drops clients idle for two full windows.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let idle_after = self.window_size * 2;
        let mut evicted = 0;
        self.map.retain(|_, window| {
            let keep = now.duration_since(window.lock().last_seen) < idle_after;
            evicted += usize::from(!keep);
            keep
        });
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_per_client() {
        let limiter = LoginLimiter::per_minute(3);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("10.0.0.1", now).is_ok());
        }
        let retry_after = limiter.check_at("10.0.0.1", now).unwrap_err();
        assert!((1..=60).contains(&retry_after));

        assert!(limiter.check_at("10.0.0.2", now).is_ok());
    }

    #[test]
    fn window_slides() {
        let limiter = LoginLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check_at("ip", start).is_ok());
        assert!(limiter.check_at("ip", start).is_ok());
        assert!(limiter.check_at("ip", start).is_err());

        // Half of the previous window still counts.
        let half_way = start + Duration::from_secs(15);
        assert!(limiter.check_at("ip", half_way).is_ok());
        assert!(limiter.check_at("ip", half_way).is_err());

        let much_later = start + Duration::from_secs(40);
        assert!(limiter.check_at("ip", much_later).is_ok());
    }

    #[test]
    fn reset_forgets_client() {
        let limiter = LoginLimiter::per_minute(1);
        assert!(limiter.check("ip").is_ok());
        assert!(limiter.check("ip").is_err());
        limiter.reset("ip");
        assert!(limiter.check("ip").is_ok());
    }

    #[test]
    fn eviction_counts_only_idle_clients() {
        let limiter = LoginLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check_at("idle", start).unwrap();
        limiter.check_at("active", start + Duration::from_secs(25)).unwrap();

        assert_eq!(limiter.evict_idle_at(start + Duration::from_secs(30)), 1);
        assert!(limiter.map.contains_key("active"));
        assert!(!limiter.map.contains_key("idle"));
    }

    #[test]
    fn eviction_races_with_new_clients() {
        let limiter = LoginLimiter::per_minute(5);

        std::thread::scope(|scope| {
            for t in 0..4 {
                let limiter = &limiter;
                scope.spawn(move || {
                    for i in 0..2_000 {
                        let _ = limiter.check(&format!("10.{}.{}", t, i));
                    }
                });
            }
            for _ in 0..2_000 {
                assert_eq!(limiter.evict_idle(), 0);
            }
        });

        assert_eq!(limiter.map.len(), 8_000);
    }
}
