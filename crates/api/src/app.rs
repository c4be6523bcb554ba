use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{PlayerDirectory, ReminderChannel, RosterDirectory, RsvpStore, TokenStore};
use persistence::{PlayerRepository, RosterRepository, RsvpRepository, TokenRepository};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{games, health, sessions, sms};
use crate::services::{
    EmailService, IdentityResolver, InboundSmsHandler, ReminderScheduler, RouteLinks,
    SmsGatewayClient, TokenService,
};

/// Store implementations behind the domain traits.
#[derive(Clone)]
pub struct Stores {
    pub rsvps: Arc<dyn RsvpStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub players: Arc<dyn PlayerDirectory>,
    pub roster: Arc<dyn RosterDirectory>,
}

impl Stores {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            rsvps: Arc::new(RsvpRepository::new(pool.clone())),
            tokens: Arc::new(TokenRepository::new(pool.clone())),
            players: Arc::new(PlayerRepository::new(pool.clone())),
            roster: Arc::new(RosterRepository::new(pool.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rsvps: Arc<dyn RsvpStore>,
    pub roster: Arc<dyn RosterDirectory>,
    pub identity: IdentityResolver,
    pub inbound_sms: InboundSmsHandler,
    pub reminders: ReminderScheduler,
}

impl AppState {
    /// Wires the services over the given stores and channels.
    pub fn new(
        pool: PgPool,
        config: Arc<Config>,
        stores: Stores,
        email: Arc<dyn ReminderChannel>,
        sms: Arc<dyn ReminderChannel>,
    ) -> Self {
        let tokens = TokenService::new(stores.tokens, stores.players.clone(), &config.tokens);
        let identity = IdentityResolver::new(tokens.clone(), stores.players.clone());
        let inbound_sms =
            InboundSmsHandler::new(identity.clone(), stores.rsvps.clone(), stores.roster.clone());
        let reminders = ReminderScheduler::new(
            stores.rsvps.clone(),
            stores.roster.clone(),
            stores.players,
            tokens,
            email,
            sms,
            &config.reminders,
        );

        Self {
            pool,
            config,
            rsvps: stores.rsvps,
            roster: stores.roster,
            identity,
            inbound_sms,
            reminders,
        }
    }

    /// Production wiring: PostgreSQL stores, SMTP/console email and the SMS gateway.
    pub fn from_config(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let offset = config.reminders.display_offset();
        let links = Arc::new(RouteLinks::new(config.reminders.base_url.clone()));

        let email = EmailService::new(config.email.clone(), links, offset)?;
        let sms = SmsGatewayClient::new(config.sms.clone(), offset)?;
        let stores = Stores::postgres(&pool);

        Ok(Self::new(pool, config, stores, Arc::new(email), Arc::new(sms)))
    }
}

pub fn create_app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // Webhook and reminder link targets
    let reminder_routes = Router::new()
        .route("/sms", post(sms::inbound_sms))
        .route("/game/:game_id/show", get(games::show_game))
        .route("/logout", post(sessions::logout));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(reminder_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
