pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
mod main_lib;

pub use main_lib::{
    build_email_sender, build_state, build_state_with_mailer, init_tracing, AppState,
};
