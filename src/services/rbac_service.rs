// src/services/rbac_service.rs

use crate::common::error::AppError;
use crate::models::auth::{Role, User};
use crate::models::rbac::Capabilities;
use crate::models::regulacao::RegulacaoRecord;

/// Mapeia um perfil para o seu conjunto de capacidades.
///
/// O `match` é exaustivo: um perfil novo não compila até alguém decidir
/// as permissões dele. `Role::Unknown` não recebe nada.
pub fn capabilities(role: Role) -> Capabilities {
    match role {
        Role::Admin => Capabilities::ALL,

        // Regulação Central: vê todos os encaminhamentos, não entra no E-mult
        Role::Regulacao => Capabilities {
            can_access_regulacao: true,
            can_view_all_regulacao: true,
            ..Capabilities::NONE
        },

        Role::Emult => Capabilities {
            can_access_emult: true,
            ..Capabilities::NONE
        },

        // Unidades: originam encaminhamentos e pedidos de fisioterapia,
        // mas só enxergam os próprios registros da regulação.
        Role::Fatima1
        | Role::Fatima2
        | Role::Sede1
        | Role::Sede2
        | Role::Raso1
        | Role::Raso2
        | Role::Paiaia
        | Role::Torre1
        | Role::Torre2
        | Role::Melancia
        | Role::Montealegre
        | Role::Candeia => Capabilities {
            can_access_regulacao: true,
            can_access_emult: true,
            ..Capabilities::NONE
        },

        Role::Unknown => Capabilities::NONE,
    }
}

/// Decide se `user` enxerga um registro da regulação.
/// E-mails são comparados sem diferenciar maiúsculas (mesma regra do login).
pub fn is_visible(user: &User, record: &RegulacaoRecord) -> bool {
    if capabilities(user.role).can_view_all_regulacao {
        return true;
    }
    record.criado_por_email.to_lowercase() == user.email.to_lowercase()
}

// Guardas usadas pelos serviços antes de qualquer mutação.

pub fn require_regulacao_access(user: &User) -> Result<(), AppError> {
    if !capabilities(user.role).can_access_regulacao {
        return Err(AppError::PermissionDenied(
            "Seu perfil não tem acesso ao módulo de Regulação.".into(),
        ));
    }
    Ok(())
}

pub fn require_emult_access(user: &User) -> Result<(), AppError> {
    if !capabilities(user.role).can_access_emult {
        return Err(AppError::PermissionDenied(
            "Seu perfil não tem acesso ao módulo E-mult.".into(),
        ));
    }
    Ok(())
}

pub fn require_manage_users(user: &User) -> Result<(), AppError> {
    if !capabilities(user.role).can_manage_users {
        return Err(AppError::PermissionDenied(
            "Apenas administradores podem gerenciar usuários.".into(),
        ));
    }
    Ok(())
}
