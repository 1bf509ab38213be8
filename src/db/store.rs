// src/db/store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::common::error::AppError;

// Chaves fixas das coleções
pub const USERS_KEY: &str = "sismun_users_db";
pub const SESSION_KEY: &str = "sismun_user";
pub const REGULACAO_KEY: &str = "sismun_regulacao_db";
pub const FISIOTERAPIA_KEY: &str = "sismun_fisioterapia_db";

/// Armazenamento chave-valor de blobs JSON.
///
/// Cada chave guarda uma coleção inteira; `save` substitui o valor todo
/// (último a gravar vence).
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Value>, AppError>;
    async fn save(&self, key: &str, value: Value) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

// Usado em testes e quando não há DATABASE_URL.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), AppError> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.data.write().await.remove(key);
        Ok(())
    }
}
