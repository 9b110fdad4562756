//! Portal Store for Web Portals.
//!
//! CRUD over the partitions and services shown in the sidebar, plus the two
//! sidebar preferences (active service, sidebar visibility), backed by SQLite.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::StoreError;
use crate::types::portal::{Partition, Service, ServiceDraft};

const ACTIVE_SERVICE_KEY: &str = "active_service_id";
const SIDEBAR_VISIBLE_KEY: &str = "sidebar_visible";

/// Trait defining portal persistence operations.
pub trait PortalStoreTrait {
    fn list_partitions(&self) -> Result<Vec<Partition>, StoreError>;
    fn create_partition(&mut self, name: &str) -> Result<Partition, StoreError>;
    fn update_partition(&mut self, id: &str, name: &str) -> Result<(), StoreError>;
    fn delete_partition(&mut self, id: &str) -> Result<(), StoreError>;
    fn list_services(&self) -> Result<Vec<Service>, StoreError>;
    fn create_service(&mut self, draft: &ServiceDraft) -> Result<Service, StoreError>;
    fn update_service(&mut self, id: &str, draft: &ServiceDraft) -> Result<(), StoreError>;
    fn update_sort_order(&mut self, order: &[(String, i64)]) -> Result<(), StoreError>;
    fn delete_service(&mut self, id: &str) -> Result<(), StoreError>;
    fn active_service_id(&self) -> Result<Option<String>, StoreError>;
    fn save_active_service_id(&mut self, id: Option<&str>) -> Result<(), StoreError>;
    fn sidebar_visible(&self) -> Result<bool, StoreError>;
    fn save_sidebar_visible(&mut self, visible: bool) -> Result<(), StoreError>;
}

pub struct PortalStore {
    db: Database,
}

impl PortalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn validate(draft: &ServiceDraft) -> Result<(), StoreError> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::Invalid("service name cannot be empty".to_string()));
        }
        if !draft.url.starts_with("http://") && !draft.url.starts_with("https://") {
            return Err(StoreError::Invalid(format!(
                "service url must start with http:// or https://: {}",
                draft.url
            )));
        }
        Ok(())
    }

    fn ensure_partition(&self, id: &str) -> Result<(), StoreError> {
        let found: Option<String> = self
            .db
            .connection()
            .query_row("SELECT id FROM partitions WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        found
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("partition {}", id)))
    }

    fn get_pref(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .db
            .connection()
            .query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?)
    }

    fn set_pref(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let conn = self.db.connection();
        match value {
            Some(v) => conn.execute(
                "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
                params![key, v],
            )?,
            None => conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?,
        };
        Ok(())
    }

    fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
        Ok(Service {
            id: row.get(0)?,
            partition_id: row.get(1)?,
            name: row.get(2)?,
            url: row.get(3)?,
            enabled: row.get(4)?,
            hidden: row.get(5)?,
            sort_order: row.get(6)?,
        })
    }
}

impl PortalStoreTrait for PortalStore {
    fn list_partitions(&self) -> Result<Vec<Partition>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT id, name FROM partitions ORDER BY created_at, rowid")?;
        let partitions = stmt
            .query_map([], |row| {
                Ok(Partition {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(partitions)
    }

    fn create_partition(&mut self, name: &str) -> Result<Partition, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("partition name cannot be empty".to_string()));
        }
        let partition = Partition {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.db.connection().execute(
            "INSERT INTO partitions (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![partition.id, partition.name, Self::now_ts()],
        )?;
        Ok(partition)
    }

    fn update_partition(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let changed = self
            .db
            .connection()
            .execute("UPDATE partitions SET name = ?1 WHERE id = ?2", params![name, id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("partition {}", id)));
        }
        Ok(())
    }

    /// Deleting a partition removes its services with it.
    fn delete_partition(&mut self, id: &str) -> Result<(), StoreError> {
        let changed = self
            .db
            .connection()
            .execute("DELETE FROM partitions WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("partition {}", id)));
        }
        Ok(())
    }

    /// Services with an explicit sort order come first, in that order; the
    /// rest follow in creation order.
    fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, partition_id, name, url, enabled, hidden, sort_order FROM services
             ORDER BY sort_order IS NULL, sort_order, created_at, rowid",
        )?;
        let services = stmt
            .query_map([], Self::service_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    /// Inserts a service under an existing partition.
    ///
    /// # Errors
    /// * `StoreError::Invalid` if the name is blank or the URL is not http(s).
    /// * `StoreError::NotFound` if `draft.partition_id` names no partition.
    /// * `StoreError::Database` on SQLite failure.
    fn create_service(&mut self, draft: &ServiceDraft) -> Result<Service, StoreError> {
        Self::validate(draft)?;
        self.ensure_partition(&draft.partition_id)?;

        let service = Service {
            id: Uuid::new_v4().to_string(),
            partition_id: draft.partition_id.clone(),
            name: draft.name.clone(),
            url: draft.url.clone(),
            enabled: draft.enabled,
            hidden: draft.hidden,
            sort_order: None,
        };
        self.db.connection().execute(
            "INSERT INTO services (id, partition_id, name, url, enabled, hidden, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                service.id,
                service.partition_id,
                service.name,
                service.url,
                service.enabled,
                service.hidden,
                Self::now_ts()
            ],
        )?;
        Ok(service)
    }

    /// # Errors
    /// Returns `StoreError::NotFound` if either the service or its target
    /// partition is unknown, `StoreError::Invalid` for a blank name or a
    /// non-http(s) URL.
    fn update_service(&mut self, id: &str, draft: &ServiceDraft) -> Result<(), StoreError> {
        Self::validate(draft)?;
        self.ensure_partition(&draft.partition_id)?;

        let changed = self.db.connection().execute(
            "UPDATE services SET partition_id = ?1, name = ?2, url = ?3, enabled = ?4, hidden = ?5
             WHERE id = ?6",
            params![draft.partition_id, draft.name, draft.url, draft.enabled, draft.hidden, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("service {}", id)));
        }
        Ok(())
    }

    /// Unknown service ids in `order` are skipped.
    fn update_sort_order(&mut self, order: &[(String, i64)]) -> Result<(), StoreError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        for (service_id, sort_order) in order {
            tx.execute(
                "UPDATE services SET sort_order = ?1 WHERE id = ?2",
                params![sort_order, service_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_service(&mut self, id: &str) -> Result<(), StoreError> {
        let changed = self
            .db
            .connection()
            .execute("DELETE FROM services WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("service {}", id)));
        }
        Ok(())
    }

    fn active_service_id(&self) -> Result<Option<String>, StoreError> {
        self.get_pref(ACTIVE_SERVICE_KEY)
    }

    fn save_active_service_id(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        self.set_pref(ACTIVE_SERVICE_KEY, id)
    }

    /// Defaults to visible when never saved.
    fn sidebar_visible(&self) -> Result<bool, StoreError> {
        Ok(self
            .get_pref(SIDEBAR_VISIBLE_KEY)?
            .map(|v| v == "true")
            .unwrap_or(true))
    }

    fn save_sidebar_visible(&mut self, visible: bool) -> Result<(), StoreError> {
        let value = if visible { "true" } else { "false" };
        self.set_pref(SIDEBAR_VISIBLE_KEY, Some(value))
    }
}
