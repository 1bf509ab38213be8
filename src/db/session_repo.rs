// src/db/session_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::{Store, SESSION_KEY},
    models::auth::User,
};

// Guarda o usuário logado sob a chave de sessão.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn Store>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn save(&self, user: &User) -> Result<(), AppError> {
        self.store.save(SESSION_KEY, serde_json::to_value(user)?).await
    }

    pub async fn load(&self) -> Result<Option<User>, AppError> {
        match self.store.load(SESSION_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.remove(SESSION_KEY).await
    }
}
