// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::rbac::Capabilities,
    services::rbac_service::capabilities,
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn allows(caps: &Capabilities) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Resolve as capacidades do perfil, sem consultar o armazenamento
        if !T::allows(&capabilities(user.0.role)) {
            return Err(AppError::PermissionDenied(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                T::slug()
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermRegulacaoAccess;
impl PermissionDef for PermRegulacaoAccess {
    fn slug() -> &'static str { "regulacao:access" }
    fn allows(caps: &Capabilities) -> bool { caps.can_access_regulacao }
}

pub struct PermEmultAccess;
impl PermissionDef for PermEmultAccess {
    fn slug() -> &'static str { "emult:access" }
    fn allows(caps: &Capabilities) -> bool { caps.can_access_emult }
}

pub struct PermImportExport;
impl PermissionDef for PermImportExport {
    fn slug() -> &'static str { "regulacao:export" }
    fn allows(caps: &Capabilities) -> bool { caps.can_import_export }
}

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn slug() -> &'static str { "users:manage" }
    fn allows(caps: &Capabilities) -> bool { caps.can_manage_users }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    #[test]
    fn permission_types_follow_role_capabilities() {
        assert!(PermManageUsers::allows(&capabilities(Role::Admin)));
        assert!(!PermManageUsers::allows(&capabilities(Role::Regulacao)));
        assert!(PermEmultAccess::allows(&capabilities(Role::Candeia)));
        assert!(!PermEmultAccess::allows(&capabilities(Role::Regulacao)));
        assert!(!PermRegulacaoAccess::allows(&capabilities(Role::Emult)));
        assert!(!PermImportExport::allows(&capabilities(Role::Sede1)));
        assert!(!PermRegulacaoAccess::allows(&capabilities(Role::Unknown)));
    }
}
