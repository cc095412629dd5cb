pub mod gateway;
pub mod repository;
pub mod routes;
pub mod state;
