// Web Portals shared type definitions
// Each submodule defines types used across the core and its bindings.

pub mod download;
pub mod errors;
pub mod notification;
pub mod portal;
pub mod screen;
pub mod session;
pub mod settings;
pub mod shortcut;
pub mod visibility;
