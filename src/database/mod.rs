//! Web Portals database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! partition and service records behind the sidebar.
//!
//! # Usage
//!
//! ```no_run
//! use webportals::database::Database;
//!
//! let db = Database::open("portals.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
