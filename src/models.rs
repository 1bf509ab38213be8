pub mod auth;
pub mod rbac;
pub mod query;
pub mod regulacao;
pub mod fisioterapia;
