// Web Portals state managers
// Managers own stateful bookkeeping: downloads, session registrations, portals, shortcuts.

pub mod download_manager;
pub mod portal_store;
pub mod session_registry;
pub mod shortcut_manager;
