pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod models;
pub mod services;
pub mod storage;
