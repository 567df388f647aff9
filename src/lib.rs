pub mod classifier;
pub mod client;
pub mod config;
pub mod engine;
pub mod models;
pub mod repository;
pub mod screens;
pub mod session;
pub mod stores;
