pub mod config;
pub mod dto;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
