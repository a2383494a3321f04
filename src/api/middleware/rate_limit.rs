//! Per-client rate limiting using a token bucket.

use axum::Router;
use axum::body::Body;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Rate limit profile of a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// 2 requests per second, bursts of 100. Catalogue, bookings, admin.
    General,
    /// 1 request per second, bursts of 10. Token endpoints.
    Secure,
}

impl Tier {
    fn quota(self) -> (u64, u32) {
        match self {
            Tier::General => (2, 100),
            Tier::Secure => (1, 10),
        }
    }
}

/// Applies a rate limiter to every route of `router`.
///
/// Clients are keyed by IP. With `behind_proxy` the IP is read from
/// `X-Forwarded-For` / `X-Real-IP` / `Forwarded`, falling back to the peer
/// address; otherwise only the socket peer address is used. Requests over
/// the limit receive `429 Too Many Requests`.
///
/// The server must be started with `into_make_service_with_connect_info`.
///
/// ```rust,ignore
/// let token_routes = rate_limit::apply(token_routes, Tier::Secure, config.behind_proxy);
/// ```
pub fn apply<S>(router: Router<S>, tier: Tier, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let (per_second, burst) = tier.quota();

    if behind_proxy {
        router.layer(governor_layer(SmartIpKeyExtractor, per_second, burst))
    } else {
        router.layer(governor_layer(PeerIpKeyExtractor, per_second, burst))
    }
}

fn governor_layer<K: KeyExtractor>(
    key_extractor: K,
    per_second: u64,
    burst: u32,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, Body> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_second(per_second)
        .burst_size(burst)
        .finish()
        .expect("rate limit quota must be non-zero");

    GovernorLayer::new(Arc::new(config))
}
