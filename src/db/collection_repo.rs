// src/db/collection_repo.rs

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::common::error::AppError;
use crate::db::store::Store;

/// Repositório de uma coleção inteira guardada sob uma chave fixa.
///
/// Toda mutação é leitura-modificação-gravação da coleção completa.
/// O mutex serializa esses ciclos dentro do processo; se a função de
/// alteração falhar, nada é gravado.
pub struct CollectionRepository<T> {
    store: Arc<dyn Store>,
    key: &'static str,
    seed: fn() -> Vec<T>,
    reseed_when_empty: bool,
    lock: Arc<Mutex<()>>,
}

impl<T> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            seed: self.seed,
            reseed_when_empty: self.reseed_when_empty,
            lock: self.lock.clone(),
        }
    }
}

impl<T> CollectionRepository<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(store: Arc<dyn Store>, key: &'static str, seed: fn() -> Vec<T>) -> Self {
        Self {
            store,
            key,
            seed,
            reseed_when_empty: false,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Coleção vazia também volta para os dados de exemplo.
    pub fn reseed_when_empty(mut self) -> Self {
        self.reseed_when_empty = true;
        self
    }

    // Busca a coleção completa
    pub async fn load_all(&self) -> Result<Vec<T>, AppError> {
        let _guard = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Aplica `change` sobre a coleção e grava o resultado só se ela retornar `Ok`.
    pub async fn update<R, F>(&self, change: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load_unlocked().await?;
        let output = change(&mut records)?;
        self.save_unlocked(&records).await?;
        Ok(output)
    }

    async fn load_unlocked(&self) -> Result<Vec<T>, AppError> {
        let stored = match self.store.load(self.key).await? {
            Some(value) => Some(serde_json::from_value::<Vec<T>>(value)?),
            None => None,
        };

        match stored {
            Some(records) if !(records.is_empty() && self.reseed_when_empty) => Ok(records),
            _ => {
                let seeded = (self.seed)();
                tracing::info!("🌱 Coleção '{}' semeada com {} registros.", self.key, seeded.len());
                self.save_unlocked(&seeded).await?;
                Ok(seeded)
            }
        }
    }

    async fn save_unlocked(&self, records: &[T]) -> Result<(), AppError> {
        let value = serde_json::to_value(records)?;
        self.store.save(self.key, value).await
    }
}
