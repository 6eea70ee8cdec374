//! Application state and rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use canvass_core::Catalog;
use tokio::sync::{Mutex, RwLock};

use super::RATE_LIMIT_WINDOW_SECS;
use crate::stores::Stores;

/// Requests seen from one client in the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    requests: u64,
}

/// Fixed-window per-IP rate limiter. Windows that have expired are dropped
/// on every check, so the table only holds clients seen in the last window.
pub(crate) struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    pub(crate) max_requests: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
        }
    }

    /// Count a request from `ip`.
    /// Returns Err(retry_after_secs) once the window's budget is spent.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), u64> {
        let span = Duration::from_secs(RATE_LIMIT_WINDOW_SECS);
        let mut windows = self.windows.lock().await;
        windows.retain(|_, w| now.saturating_duration_since(w.started) < span);

        let window = windows.entry(ip).or_insert(Window {
            started: now,
            requests: 0,
        });
        window.requests += 1;
        if window.requests <= self.max_requests {
            return Ok(());
        }
        let remaining = span.saturating_sub(now.saturating_duration_since(window.started));
        Err(remaining.as_secs().max(1))
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// The live catalog. Mutations are saved through `stores.catalog`
    /// before they replace this value.
    pub(crate) catalog: RwLock<Catalog>,
    pub(crate) stores: Stores,
    pub(crate) rate_limiter: RateLimiter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn limiter_blocks_after_budget() {
        let limiter = RateLimiter::new(2);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_ok());
        let retry = limiter.check(ip).await.unwrap_err();
        assert!(retry <= RATE_LIMIT_WINDOW_SECS);

        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert!(limiter.check(other).await.is_ok());
    }

    #[tokio::test]
    async fn expired_windows_are_dropped() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check_at(a, start).await.is_ok());
        assert!(limiter.check_at(b, start).await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 2);
        assert!(limiter.check_at(a, start).await.is_err());

        let later = start + Duration::from_secs(RATE_LIMIT_WINDOW_SECS);
        assert!(limiter.check_at(a, later).await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
