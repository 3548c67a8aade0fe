use crate::{
    api::{attendance, employee, report},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::Context;
use std::sync::Arc;

type IpLimiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> anyhow::Result<IpLimiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limiter settings")?;

    Ok(Governor::new(&cfg))
}

/// Rate limiters, built once at start-up and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<IpLimiter>,
    register: Arc<IpLimiter>,
    protected: Arc<IpLimiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            register: Arc::new(build_limiter(config.rate_register_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(limiters.register.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/setup-admin")
                    .wrap(limiters.register.clone())
                    .route(web::get().to(handlers::setup_admin)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            // /attendance
            .service(
                web::resource("/attendance")
                    .route(web::post().to(attendance::save_attendance))
                    .route(web::get().to(attendance::list_attendance)),
            )
            // /attendance/preview
            .service(
                web::resource("/attendance/preview")
                    .route(web::post().to(attendance::preview_shift)),
            )
            // /reports
            .service(web::resource("/reports").route(web::get().to(report::monthly_report))),
    );
}
