// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        seed,
        store::{FISIOTERAPIA_KEY, REGULACAO_KEY, USERS_KEY},
        CollectionRepository, MemoryStore, PgStore, SessionRepository, Store,
    },
    services::{
        auth::AuthService, fisioterapia_service::FisioterapiaService, regulacao_service::RegulacaoService,
        user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

// Configuração lida do ambiente (.env incluso)
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub bcrypt_cost: u32,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw.parse().context("BCRYPT_COST deve ser um número")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        let token_ttl_days = match env::var("TOKEN_TTL_DAYS") {
            Ok(raw) => raw.parse().context("TOKEN_TTL_DAYS deve ser um número")?,
            Err(_) => DEFAULT_TOKEN_TTL_DAYS,
        };

        Ok(Self { jwt_secret, database_url, bind_addr, bcrypt_cost, token_ttl_days })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub regulacao_service: RegulacaoService,
    pub fisioterapia_service: FisioterapiaService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = config.database_url.as_deref() else {
            tracing::warn!("⚠️ DATABASE_URL não definida: usando armazenamento em memória (dados se perdem ao reiniciar).");
            return Ok(Self::with_store(Arc::new(MemoryStore::new()), None, config));
        };

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let store = Arc::new(PgStore::new(db_pool.clone()));
        Ok(Self::with_store(store, Some(db_pool), config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn Store>, db_pool: Option<PgPool>, config: &Config) -> Self {
        let user_repo = CollectionRepository::new(store.clone(), USERS_KEY, seed::initial_users);
        let session_repo = SessionRepository::new(store.clone());
        let regulacao_repo = CollectionRepository::new(store.clone(), REGULACAO_KEY, seed::initial_regulacao);
        let fisioterapia_repo =
            CollectionRepository::new(store, FISIOTERAPIA_KEY, seed::initial_fisioterapia).reseed_when_empty();

        Self {
            db_pool,
            auth_service: AuthService::new(
                user_repo.clone(),
                session_repo,
                config.jwt_secret.clone(),
                config.token_ttl_days,
            ),
            user_service: UserService::new(user_repo, config.bcrypt_cost),
            regulacao_service: RegulacaoService::new(regulacao_repo),
            fisioterapia_service: FisioterapiaService::new(fisioterapia_repo),
        }
    }
}
