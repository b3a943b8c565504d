use geosearch_core::db::migrations::latest_version;
use geosearch_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "places");
    assert_index_exists(&conn, "idx_places_active_created");
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("places.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO places (place_id, name, latitude, longitude, earth)
             VALUES ('p-1', 'Pier', 40.0, -74.0, ll_to_earth(40.0, -74.0));",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM places;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failing_migration_reports_its_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE places (legacy_id INTEGER PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::Migration { version, .. } => assert_eq!(*version, 1),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("migration 1"));
    assert!(std::error::Error::source(&err).is_some());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
}

#[test]
fn schema_rejects_out_of_range_coordinates() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO places (place_id, name, latitude, longitude, earth)
         VALUES ('p-2', 'North of north', 95.0, 0.0, '(0, 0, 0)');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn geometry_functions_are_registered_on_open() {
    let conn = open_db_in_memory().unwrap();
    let radius: f64 = conn
        .query_row("SELECT earth();", [], |row| row.get(0))
        .unwrap();
    assert_eq!(radius, 6_378_168.0);

    let (latitude, longitude): (f64, f64) = conn
        .query_row(
            "SELECT latitude(ll_to_earth(12.5, -45.0)), longitude(ll_to_earth(12.5, -45.0));",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!((latitude - 12.5).abs() < 1e-9);
    assert!((longitude + 45.0).abs() < 1e-9);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
