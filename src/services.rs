pub mod auth;
pub mod rbac_service;
pub mod query_service;
pub mod dashboard_service;
pub mod regulacao_service;
pub mod fisioterapia_service;
pub mod user_service;
