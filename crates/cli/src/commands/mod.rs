pub mod agent;
pub mod models;
