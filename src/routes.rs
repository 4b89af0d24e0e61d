use crate::{
    api::attendance,
    auth::middleware::auth_middleware,
    config::Config,
    error::AttendanceError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limit of `requests_per_min` with an equal burst. The limiter state
/// lives in the config, so every worker built from it shares one budget.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min}/min"))
}

/// Routes behind bearer authentication, relative to the API prefix.
pub fn protected_routes(cfg: &mut web::ServiceConfig) {
    // malformed query strings get the same JSON body as a bad month/year
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected attendance query");
        AttendanceError::InvalidPeriod(err.to_string()).into()
    });

    cfg.service(
        web::scope("/attendance")
            .app_data(query_config)
            // /attendance?month=&year=
            .service(web::resource("").route(web::get().to(attendance::monthly_attendance))),
    );
}

pub fn configure(
    cfg: &mut web::ServiceConfig,
    config: &Config,
    limiter: &LimiterConfig,
) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .configure(protected_routes),
    );
}
