pub mod application;
pub mod commands;
pub mod http;
pub mod metadata;
pub mod package;
pub mod runtime;
