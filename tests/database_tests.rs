use rusqlite::params;
use tempfile::tempdir;
use vigil_core::storage::ProjectRegistry;

#[test]
fn initialize_pool_creates_core_tables() {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("vigil.db");
    let registry = ProjectRegistry::new(db_path.to_string_lossy().as_ref(), 1).expect("registry");
    let conn = registry.get_conn().expect("conn");

    let table_exists = |name: &str| -> bool {
        conn.query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get::<_, String>(0),
        )
        .map(|_| true)
        .unwrap_or(false)
    };

    assert!(table_exists("projects"));
    assert!(table_exists("events"));
}

#[test]
fn new_projects_start_with_empty_flags() {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("vigil.db");
    let registry = ProjectRegistry::new(db_path.to_string_lossy().as_ref(), 1).expect("registry");

    let project = registry
        .create_project(1, "fresh", None)
        .expect("create project");
    assert!(project.flags.is_empty());
}
