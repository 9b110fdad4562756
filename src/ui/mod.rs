//! Web Portals native UI layer.
//!
//! Uses `wry` for the presentation view and the portal views:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! `tao` owns the main window and event loop, `tray-icon` the tray icon and
//! its menu, `rfd` the save dialog. Everything here is a binding: behavior
//! lives in the core, reached through the adapters in [`bridge`].

pub mod bridge;
pub mod shell_app;
