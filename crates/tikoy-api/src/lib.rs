pub mod routes;
pub mod state;
pub mod tikoys;
pub mod validate;
