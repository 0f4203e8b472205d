use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};

use rserve_api::{create_app, telemetry, AppState, AuthGate, CookieManager};
use rserve_core::{
    Account, AccountRepository, AuthService, Clock, InMemoryAccountRepository,
    InMemorySessionStore, PasswordHasher, RefreshCoordinator, Role, SessionCleanupConfig,
    SessionCleanupService, SessionStore, SystemClock, TokenCodec, TokenIssuer,
    TokenServiceConfig, TokenVerifier,
};
use rserve_infra::cache::{RedisClient, RedisSessionStore};
use rserve_infra::database::{DatabasePool, MySqlAccountRepository, MySqlSessionStore};
use rserve_shared::{AppConfig, SessionBackend};

type DynSessionStore = Arc<dyn SessionStore>;
type DynAccountRepository = Arc<dyn AccountRepository>;

const BCRYPT_COST: u32 = 12;

/// `<id>:<password>` of an account to register when accounts are not read from MySQL
const BOOTSTRAP_ACCOUNT_VAR: &str = "RSERVE_BOOTSTRAP_ACCOUNT";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging).map_err(|e| anyhow!(e))?;

    info!(
        environment = %config.environment,
        backend = ?config.session.backend,
        "Starting RServe API server"
    );
    if config.auth.jwt.is_using_default_secret() {
        warn!("Using the built-in JWT secret; set SESSION_SECRET outside development");
    }
    if !config.auth.cookies.secure {
        warn!("Auth cookies are sent without the Secure attribute");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_config = TokenServiceConfig::from(&config.auth.jwt);
    let codec = Arc::new(TokenCodec::new(&token_config, clock.clone())?);
    let issuer = Arc::new(TokenIssuer::new(codec.clone(), token_config));
    let verifier = TokenVerifier::new(codec.clone());
    let hasher = PasswordHasher::new(BCRYPT_COST)?;

    let (store, accounts) = build_backends(&config, &hasher).await?;

    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::new(store.clone()),
        codec,
        issuer,
        Duration::from_millis(config.session.store_timeout_ms),
    ));

    let cleanup = SessionCleanupService::new(
        Arc::new(store),
        clock,
        SessionCleanupConfig::from(&config.session),
    );
    Arc::new(cleanup).start_background_task();

    let auth_service = Arc::new(AuthService::new(Arc::new(accounts), coordinator, hasher));
    let cookies = CookieManager::new(config.auth.cookies.clone());
    let app_state = web::Data::new(AppState::new(auth_service, cookies.clone()));
    let gate = AuthGate::new(verifier, cookies);

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone(), gate.clone()))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Session store and account source for the configured backend
async fn build_backends(
    config: &AppConfig,
    hasher: &PasswordHasher,
) -> anyhow::Result<(DynSessionStore, DynAccountRepository)> {
    match config.session.backend {
        SessionBackend::Mysql => {
            let database = DatabasePool::new(&config.database).await?;
            database.run_migrations().await?;
            info!(pool = %database.statistics(), "MySQL session store ready");

            let pool = database.pool().clone();
            let store: DynSessionStore = Arc::new(MySqlSessionStore::new(pool.clone()));
            let accounts: DynAccountRepository = Arc::new(MySqlAccountRepository::new(pool));
            Ok((store, accounts))
        }
        SessionBackend::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            info!(url = %config.cache.url, "Redis session store ready");

            let store: DynSessionStore = Arc::new(RedisSessionStore::new(client));
            Ok((store, bootstrap_accounts(hasher).await?))
        }
        SessionBackend::Memory => {
            warn!("In-memory session store: sessions end when the process exits");
            let store: DynSessionStore = Arc::new(InMemorySessionStore::new());
            Ok((store, bootstrap_accounts(hasher).await?))
        }
    }
}

async fn bootstrap_accounts(hasher: &PasswordHasher) -> anyhow::Result<DynAccountRepository> {
    let accounts = InMemoryAccountRepository::new();

    match std::env::var(BOOTSTRAP_ACCOUNT_VAR) {
        Ok(value) => {
            let Some((id, password)) = value.split_once(':') else {
                bail!("{} must look like <id>:<password>", BOOTSTRAP_ACCOUNT_VAR);
            };
            let hash = hasher.hash(password).await?;
            accounts.insert(Account::new(id, hash, Role::Owner)).await;
            info!(account_id = id, "Registered bootstrap account");
        }
        Err(_) => warn!("No account source configured; every login will be rejected"),
    }

    Ok(Arc::new(accounts))
}
