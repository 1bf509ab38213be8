// src/services/user_service.rs

use bcrypt::hash;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{NewUserPayload, Session, UpdateUserPayload, User},
    services::rbac_service::require_manage_users,
};

// Gestão de usuários (somente ADMIN)
#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: UserRepository, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<User>, AppError> {
        require_manage_users(session.user())?;
        self.repo.load_all().await
    }

    pub async fn create(&self, session: &Session, payload: NewUserPayload) -> Result<User, AppError> {
        require_manage_users(session.user())?;
        payload.validate()?;

        // Hash fora do lock da coleção
        let password_hash = self.hash_password(payload.password).await?;
        let user = User {
            id: Uuid::new_v4(),
            email: payload.email.trim().to_string(),
            name: payload.name.trim().to_string(),
            role: payload.role,
            group_name: payload.group_name.trim().to_string(),
            password_hash,
        };

        let created = self
            .repo
            .update(|users| {
                if users.iter().any(|u| u.email_matches(&user.email)) {
                    return Err(AppError::EmailAlreadyExists);
                }
                users.push(user.clone());
                Ok(user)
            })
            .await?;

        tracing::info!("👤 Usuário {} criado por {}", created.email, session.user().email);
        Ok(created)
    }

    pub async fn update(&self, session: &Session, id: Uuid, payload: UpdateUserPayload) -> Result<User, AppError> {
        require_manage_users(session.user())?;
        payload.validate()?;

        let new_hash = self.hash_password(payload.password).await?;

        let updated = self
            .repo
            .update(|users| {
                if let Some(email) = payload.email.as_deref() {
                    if users.iter().any(|u| u.id != id && u.email_matches(email)) {
                        return Err(AppError::EmailAlreadyExists);
                    }
                }

                let user = users
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Usuário {id}")))?;

                if let Some(email) = payload.email {
                    user.email = email.trim().to_string();
                }
                if let Some(name) = payload.name {
                    user.name = name.trim().to_string();
                }
                if let Some(role) = payload.role {
                    user.role = role;
                }
                if let Some(group_name) = payload.group_name {
                    user.group_name = group_name.trim().to_string();
                }
                // Senha vazia mantém a atual
                if new_hash.is_some() {
                    user.password_hash = new_hash;
                }
                Ok(user.clone())
            })
            .await?;

        tracing::info!("✏️ Usuário {} alterado por {}", updated.email, session.user().email);
        Ok(updated)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        let current = session.user();
        require_manage_users(current)?;
        if current.id == id {
            return Err(AppError::PermissionDenied(
                "Você não pode excluir o próprio usuário.".into(),
            ));
        }

        self.repo
            .update(|users| {
                let before = users.len();
                users.retain(|u| u.id != id);
                if users.len() == before {
                    return Err(AppError::NotFound(format!("Usuário {id}")));
                }
                Ok(())
            })
            .await?;

        tracing::warn!("🗑️ Usuário {} excluído por {}", id, current.email);
        Ok(())
    }

    // Senha em branco = sem hash (senha padrão no cadastro, mantém a atual na edição).
    // O trim só decide o "em branco"; o hash é da senha exatamente como digitada.
    async fn hash_password(&self, password: Option<String>) -> Result<Option<String>, AppError> {
        let Some(password) = password.filter(|p| !p.trim().is_empty()) else {
            return Ok(None);
        };
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(Some(hashed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::{seed, store::USERS_KEY, CollectionRepository, MemoryStore, SessionRepository, Store};
    use crate::models::auth::Role;
    use crate::services::auth::AuthService;

    fn service_on(store: Arc<dyn Store>) -> UserService {
        UserService::new(CollectionRepository::new(store, USERS_KEY, seed::initial_users), 4)
    }

    fn service() -> UserService {
        service_on(Arc::new(MemoryStore::new()))
    }

    fn admin() -> Session {
        Session::new(seed::initial_users().remove(0))
    }

    fn payload(email: &str) -> NewUserPayload {
        NewUserPayload {
            email: email.into(),
            name: "Equipe Nova".into(),
            role: Role::Raso1,
            group_name: "Unidade Raso 1".into(),
            password: None,
        }
    }

    #[tokio::test]
    async fn only_admin_manages_users() {
        let svc = service();
        let unit = Session::new(seed::initial_users().remove(1));

        assert!(matches!(svc.list(&unit).await, Err(AppError::PermissionDenied(_))));
        assert!(matches!(svc.create(&unit, payload("n@saude.com")).await, Err(AppError::PermissionDenied(_))));
        assert_eq!(svc.list(&admin()).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn email_must_be_unique_ignoring_case() {
        let svc = service();
        let err = svc.create(&admin(), payload("F1@SAUDE.COM")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));

        let created = svc.create(&admin(), payload("nova@saude.com")).await.unwrap();
        assert!(created.password_hash.is_none());

        let clash = UpdateUserPayload { email: Some("admin@saude.com".into()), ..Default::default() };
        let err = svc.update(&admin(), created.id, clash).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));

        // Manter o próprio e-mail não conflita
        let same = UpdateUserPayload { email: Some("NOVA@saude.com".into()), ..Default::default() };
        assert!(svc.update(&admin(), created.id, same).await.is_ok());
    }

    #[tokio::test]
    async fn blank_password_keeps_previous_hash() {
        let svc = service();
        let mut new = payload("nova@saude.com");
        new.password = Some("segura".into());
        let created = svc.create(&admin(), new).await.unwrap();
        let hash = created.password_hash.clone().unwrap();
        assert!(bcrypt::verify("segura", &hash).unwrap());

        let patch = UpdateUserPayload {
            name: Some("Equipe Renomeada".into()),
            password: Some("  ".into()),
            ..Default::default()
        };
        let updated = svc.update(&admin(), created.id, patch).await.unwrap();
        assert_eq!(updated.name, "Equipe Renomeada");
        assert_eq!(updated.password_hash, Some(hash));
    }

    #[tokio::test]
    async fn password_with_surrounding_spaces_is_kept_verbatim() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let svc = service_on(store.clone());
        let auth = AuthService::new(
            CollectionRepository::new(store.clone(), USERS_KEY, seed::initial_users),
            SessionRepository::new(store),
            "segredo-de-teste".into(),
            7,
        );

        let mut new = payload("nova@saude.com");
        new.password = Some(" minha senha ".into());
        svc.create(&admin(), new).await.unwrap();

        let logged = auth.authenticate("nova@saude.com", " minha senha ").await.unwrap();
        assert_eq!(logged.map(|u| u.email), Some("nova@saude.com".to_string()));
        assert!(auth.authenticate("nova@saude.com", "minha senha").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let svc = service();
        let me = admin();
        let before = svc.list(&me).await.unwrap();

        let err = svc.delete(&me, me.user().id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert_eq!(svc.list(&me).await.unwrap(), before);

        let other = seed::initial_users()[2].id;
        svc.delete(&me, other).await.unwrap();
        let expected: Vec<User> = before.iter().filter(|u| u.id != other).cloned().collect();
        assert_eq!(svc.list(&me).await.unwrap(), expected);
        assert_eq!(expected.len(), before.len() - 1);

        assert!(matches!(svc.delete(&me, other).await, Err(AppError::NotFound(_))));
        assert_eq!(svc.list(&me).await.unwrap(), expected);
    }
}
