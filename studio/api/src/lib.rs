pub mod access;
pub mod api;
pub mod catalog;
pub mod config;
pub mod database;
pub mod global;
pub mod seed;
