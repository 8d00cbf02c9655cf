pub mod routes;
pub mod state;
pub mod upload;
