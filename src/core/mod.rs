pub mod alerts;
pub mod catalog;
pub mod config;
pub mod events;
