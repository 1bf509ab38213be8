// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::not_blank;
use crate::models::rbac::Capabilities;

/// Senha assumida para usuários sem senha cadastrada.
pub const DEFAULT_PASSWORD: &str = "123";

// --- PERFIS ---
// Conjunto fechado: administrador, dois perfis de módulo e doze unidades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Regulacao,
    Emult,
    Fatima1,
    Fatima2,
    Sede1,
    Sede2,
    Raso1,
    Raso2,
    Paiaia,
    Torre1,
    Torre2,
    Melancia,
    Montealegre,
    Candeia,
    // Valor gravado fora do conjunto conhecido. Não recebe nenhuma permissão.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub const ALL: [Role; 15] = [
        Role::Admin,
        Role::Regulacao,
        Role::Emult,
        Role::Fatima1,
        Role::Fatima2,
        Role::Sede1,
        Role::Sede2,
        Role::Raso1,
        Role::Raso2,
        Role::Paiaia,
        Role::Torre1,
        Role::Torre2,
        Role::Melancia,
        Role::Montealegre,
        Role::Candeia,
    ];
}

// Representa um usuário como ele é gravado no armazenamento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub group_name: String,

    // Hash bcrypt. Ausente = senha padrão.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl User {
    pub fn email_matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.trim().to_lowercase()
    }
}

// O que sai pela API: nunca expõe a senha.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "f1@saude.com")]
    pub email: String,
    #[schema(example = "Equipe Fátima 1")]
    pub name: String,
    pub role: Role,
    #[schema(example = "Unidade Fátima 1")]
    pub group_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            group_name: user.group_name.clone(),
        }
    }
}

/// Usuário autenticado da operação corrente. Passado explicitamente
/// para toda máquina de estados.
#[derive(Debug, Clone)]
pub struct Session {
    pub current_user: User,
}

impl Session {
    pub fn new(current_user: User) -> Self {
        Self { current_user }
    }

    pub fn user(&self) -> &User {
        &self.current_user
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "admin@saude.com")]
    pub email: String,
    #[schema(example = "123")]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
    pub capabilities: Capabilities,
}

// Resposta de GET /me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserResponse,
    pub capabilities: Capabilities,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// Cadastro de usuário (rascunho; só vira `User` depois de validado)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "r1@saude.com")]
    pub email: String,

    #[validate(custom(function = "not_blank", message = "O nome é obrigatório."))]
    #[schema(example = "Equipe Raso 1")]
    pub name: String,

    pub role: Role,

    #[validate(custom(function = "not_blank", message = "A unidade é obrigatória."))]
    #[schema(example = "Unidade Raso 1")]
    pub group_name: String,

    // Vazio = senha padrão
    pub password: Option<String>,
}

// Edição de usuário. Campos ausentes ficam como estão; senha vazia mantém a anterior.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(custom(function = "not_blank", message = "O nome é obrigatório."))]
    pub name: Option<String>,

    pub role: Option<Role>,

    #[validate(custom(function = "not_blank", message = "A unidade é obrigatória."))]
    pub group_name: Option<String>,

    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_string_deserializes_to_sentinel() {
        let role: Role = serde_json::from_str("\"SUPERVISOR\"").unwrap();
        assert_eq!(role, Role::Unknown);
        let role: Role = serde_json::from_str("\"MONTEALEGRE\"").unwrap();
        assert_eq!(role, Role::Montealegre);
    }

    #[test]
    fn role_list_is_complete_and_distinct() {
        let distinct: std::collections::HashSet<Role> = Role::ALL.into_iter().collect();
        assert_eq!(distinct.len(), 15);
        assert!(!distinct.contains(&Role::Unknown));
    }

    #[test]
    fn password_hash_never_leaves_through_response() {
        let user = User {
            id: Uuid::nil(),
            email: "a@saude.com".into(),
            name: "A".into(),
            role: Role::Admin,
            group_name: "Admin".into(),
            password_hash: Some("$2b$04$abc".into()),
        };
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["groupName"], "Admin");
    }

    #[test]
    fn email_match_ignores_case_and_spaces() {
        let user = User {
            id: Uuid::nil(),
            email: "F1@Saude.com".into(),
            name: "F1".into(),
            role: Role::Fatima1,
            group_name: "Unidade Fátima 1".into(),
            password_hash: None,
        };
        assert!(user.email_matches(" f1@saude.COM"));
        assert!(!user.email_matches("f2@saude.com"));
    }
}
