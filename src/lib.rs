//! Web Portals: the main-process core of a desktop shell hosting many web
//! apps side by side, each in its own persistent browsing partition.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod cli;
pub mod database;
pub mod managers;
pub mod platform;
pub mod presentation;
pub mod rpc_handler;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
