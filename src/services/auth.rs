// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::{SessionRepository, UserRepository},
    models::auth::{Claims, Session, User, DEFAULT_PASSWORD},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    jwt_secret: String,
    token_ttl_days: i64,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        jwt_secret: String,
        token_ttl_days: i64,
    ) -> Self {
        Self { user_repo, session_repo, jwt_secret, token_ttl_days }
    }

    /// Procura o usuário pelo e-mail (sem diferenciar maiúsculas) e confere a senha.
    /// `None` quando o e-mail não existe ou a senha não confere.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self
            .user_repo
            .load_all()
            .await?
            .into_iter()
            .find(|u| u.email_matches(email))
        else {
            return Ok(None);
        };

        let valid = match user.password_hash.clone().filter(|h| !h.is_empty()) {
            None => password == DEFAULT_PASSWORD,
            Some(hash) => {
                let password_clone = password.to_owned();
                // Executa a verificação em um thread separado
                tokio::task::spawn_blocking(move || verify(&password_clone, &hash))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??
            }
        };

        Ok(valid.then_some(user))
    }

    /// Autentica, grava o usuário como sessão corrente e emite o token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .authenticate(email, password)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.session_repo.save(&user).await?;
        let token = self.create_token(&user)?;

        tracing::info!("🔐 Login de {} ({:?})", user.email, user.role);
        Ok((token, user))
    }

    pub async fn logout(&self, user: &User) -> Result<(), AppError> {
        self.session_repo.clear().await?;
        tracing::info!("👋 Logout de {}", user.email);
        Ok(())
    }

    /// Usuário da última sessão gravada, se houver.
    pub async fn restore_session(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session_repo.load().await?.map(Session::new))
    }

    /// Decodifica o token e recarrega o usuário, para que mudanças de perfil
    /// valham já na próxima requisição.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .load_all()
            .await?
            .into_iter()
            .find(|u| u.id == token_data.claims.sub)
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.token_ttl_days);

        let claims = Claims {
            sub: user.id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::{seed, store::USERS_KEY, CollectionRepository, MemoryStore, Store};

    fn service(store: Arc<dyn Store>) -> AuthService {
        AuthService::new(
            CollectionRepository::new(store.clone(), USERS_KEY, seed::initial_users),
            SessionRepository::new(store),
            "segredo-de-teste".into(),
            7,
        )
    }

    #[tokio::test]
    async fn login_is_case_insensitive_and_uses_default_password() {
        let svc = service(Arc::new(MemoryStore::new()));

        let user = svc.authenticate("F1@Saude.com", "123").await.unwrap().unwrap();
        assert_eq!(user.email, "f1@saude.com");
        assert!(svc.authenticate("f1@saude.com", "errada").await.unwrap().is_none());
        assert!(svc.authenticate("ninguem@saude.com", "123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hashed_password_is_verified() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let repo: UserRepository = CollectionRepository::new(store, USERS_KEY, seed::initial_users);
        let hash = bcrypt::hash("s3nh4", 4).unwrap();
        repo.update(|users| {
            users[1].password_hash = Some(hash);
            Ok(())
        })
        .await
        .unwrap();

        assert!(svc.authenticate("f1@saude.com", "s3nh4").await.unwrap().is_some());
        assert!(svc.authenticate("f1@saude.com", "123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_round_trips_and_session_is_persisted() {
        let svc = service(Arc::new(MemoryStore::new()));

        let (token, user) = svc.login("admin@saude.com", "123").await.unwrap();
        assert_eq!(svc.validate_token(&token).await.unwrap(), user);
        assert_eq!(svc.restore_session().await.unwrap().unwrap().user(), &user);

        svc.logout(&user).await.unwrap();
        assert!(svc.restore_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_credentials_and_tampered_token_are_rejected() {
        let svc = service(Arc::new(MemoryStore::new()));

        let err = svc.login("admin@saude.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = svc.validate_token("nao.e.jwt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
