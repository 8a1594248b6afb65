pub mod agent;
pub mod bot;
pub mod chatbot;
pub mod commands;
pub mod config;
pub mod error;
pub mod openai;
pub mod tools;
pub mod types;

pub use bot::run;
