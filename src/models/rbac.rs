// src/models/rbac.rs

use serde::Serialize;
use utoipa::ToSchema;

// Conjunto de capacidades derivado do perfil. Nada aqui é gravado:
// é sempre recalculado a partir do `Role`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_access_regulacao: bool,
    pub can_access_emult: bool,
    pub can_view_all_regulacao: bool,
    pub can_import_export: bool,
    pub can_edit_sensitive_fields: bool,
    pub can_delete_records: bool,
    pub can_manage_users: bool,
}

impl Capabilities {
    /// Nenhuma permissão.
    pub const NONE: Capabilities = Capabilities {
        can_access_regulacao: false,
        can_access_emult: false,
        can_view_all_regulacao: false,
        can_import_export: false,
        can_edit_sensitive_fields: false,
        can_delete_records: false,
        can_manage_users: false,
    };

    pub const ALL: Capabilities = Capabilities {
        can_access_regulacao: true,
        can_access_emult: true,
        can_view_all_regulacao: true,
        can_import_export: true,
        can_edit_sensitive_fields: true,
        can_delete_records: true,
        can_manage_users: true,
    };
}
