//! Unit tests for the partition/service store.

use webportals::database::connection::Database;
use webportals::managers::portal_store::{PortalStore, PortalStoreTrait};
use webportals::types::errors::StoreError;
use webportals::types::portal::ServiceDraft;

fn setup() -> PortalStore {
    PortalStore::new(Database::open_in_memory().unwrap())
}

fn draft(partition_id: &str, name: &str) -> ServiceDraft {
    ServiceDraft {
        partition_id: partition_id.to_string(),
        name: name.to_string(),
        url: format!("https://{}.example.com", name.to_lowercase()),
        enabled: true,
        hidden: false,
    }
}

#[test]
fn test_create_and_list_partitions() {
    let mut store = setup();
    let work = store.create_partition("Work").unwrap();
    let home = store.create_partition("Home").unwrap();

    let partitions = store.list_partitions().unwrap();
    assert_eq!(partitions, vec![work, home]);
}

#[test]
fn test_partition_name_required() {
    let mut store = setup();
    assert!(matches!(store.create_partition("  "), Err(StoreError::Invalid(_))));
}

#[test]
fn test_rename_partition() {
    let mut store = setup();
    let p = store.create_partition("Work").unwrap();
    store.update_partition(&p.id, "Office").unwrap();
    assert_eq!(store.list_partitions().unwrap()[0].name, "Office");

    assert!(matches!(
        store.update_partition("missing", "x"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_delete_partition_removes_its_services() {
    let mut store = setup();
    let work = store.create_partition("Work").unwrap();
    let home = store.create_partition("Home").unwrap();
    store.create_service(&draft(&work.id, "Mail")).unwrap();
    let kept = store.create_service(&draft(&home.id, "Chat")).unwrap();

    store.delete_partition(&work.id).unwrap();

    assert_eq!(store.list_services().unwrap(), vec![kept]);
    assert!(matches!(store.delete_partition(&work.id), Err(StoreError::NotFound(_))));
}

#[test]
fn test_service_requires_existing_partition() {
    let mut store = setup();
    assert!(matches!(
        store.create_service(&draft("nope", "Mail")),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_service_validation() {
    let mut store = setup();
    let p = store.create_partition("Work").unwrap();

    let mut blank = draft(&p.id, "Mail");
    blank.name = " ".to_string();
    assert!(matches!(store.create_service(&blank), Err(StoreError::Invalid(_))));

    let mut bad_url = draft(&p.id, "Mail");
    bad_url.url = "ftp://mail.example.com".to_string();
    assert!(matches!(store.create_service(&bad_url), Err(StoreError::Invalid(_))));
}

#[test]
fn test_update_service() {
    let mut store = setup();
    let work = store.create_partition("Work").unwrap();
    let home = store.create_partition("Home").unwrap();
    let svc = store.create_service(&draft(&work.id, "Mail")).unwrap();

    let mut changed = draft(&home.id, "Webmail");
    changed.hidden = true;
    changed.enabled = false;
    store.update_service(&svc.id, &changed).unwrap();

    let listed = &store.list_services().unwrap()[0];
    assert_eq!(listed.partition_id, home.id);
    assert_eq!(listed.name, "Webmail");
    assert!(listed.hidden);
    assert!(!listed.enabled);

    assert!(matches!(
        store.update_service("missing", &changed),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_sort_order_puts_unordered_services_last() {
    let mut store = setup();
    let p = store.create_partition("Work").unwrap();
    let a = store.create_service(&draft(&p.id, "A")).unwrap();
    store.create_service(&draft(&p.id, "B")).unwrap();
    let c = store.create_service(&draft(&p.id, "C")).unwrap();

    store
        .update_sort_order(&[(c.id.clone(), 0), (a.id.clone(), 1), ("ghost".to_string(), 2)])
        .unwrap();

    let names: Vec<String> = store.list_services().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[test]
fn test_delete_service() {
    let mut store = setup();
    let p = store.create_partition("Work").unwrap();
    let svc = store.create_service(&draft(&p.id, "Mail")).unwrap();

    store.delete_service(&svc.id).unwrap();
    assert!(store.list_services().unwrap().is_empty());
    assert!(matches!(store.delete_service(&svc.id), Err(StoreError::NotFound(_))));
}

#[test]
fn test_active_service_preference() {
    let mut store = setup();
    assert_eq!(store.active_service_id().unwrap(), None);

    store.save_active_service_id(Some("svc-1")).unwrap();
    assert_eq!(store.active_service_id().unwrap().as_deref(), Some("svc-1"));

    store.save_active_service_id(None).unwrap();
    assert_eq!(store.active_service_id().unwrap(), None);
}

#[test]
fn test_sidebar_visible_defaults_to_true() {
    let mut store = setup();
    assert!(store.sidebar_visible().unwrap());

    store.save_sidebar_visible(false).unwrap();
    assert!(!store.sidebar_visible().unwrap());
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portals.db");
    {
        let mut store = PortalStore::new(Database::open(&path).unwrap());
        let p = store.create_partition("Work").unwrap();
        store.create_service(&draft(&p.id, "Mail")).unwrap();
        store.save_sidebar_visible(false).unwrap();
    }

    let store = PortalStore::new(Database::open(&path).unwrap());
    assert_eq!(store.list_partitions().unwrap().len(), 1);
    assert_eq!(store.list_services().unwrap()[0].name, "Mail");
    assert!(!store.sidebar_visible().unwrap());
}
