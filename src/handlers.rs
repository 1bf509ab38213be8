pub mod auth;
pub mod users;
pub mod regulacao;
pub mod fisioterapia;
