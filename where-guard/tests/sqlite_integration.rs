//! Authorized filters executed against a real `SQLite` database.

use rusqlite::Connection;
use where_guard::prelude::*;

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, status TEXT, total INTEGER);
         INSERT INTO orders VALUES (1, 'open', 120);
         INSERT INTO orders VALUES (2, 'held', 40);
         INSERT INTO orders VALUES (3, 'shipped', 999);
         INSERT INTO orders VALUES (4, NULL, 75);
         INSERT INTO orders VALUES (5, 'somewhere else', 10);",
    )
    .unwrap();
    conn
}

fn parser() -> WhereParser<Sqlite> {
    WhereParser::sqlite(
        ValidatorRegistry::builder()
            .column("orders.status", "TEXT", ValueKind::String)
            .column("orders.total", "INTEGER", ValueKind::Int32)
            .build(),
    )
}

fn ids(conn: &Connection, fragment: &str) -> Vec<i64> {
    let query = parser()
        .parse_and_attach(fragment, select("orders").fields(&["id"]))
        .unwrap()
        .sort("id", SortDir::Asc)
        .build();
    let mut stmt = conn.prepare(&query.sql).unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn equality() {
    let conn = setup_db();
    assert_eq!(ids(&conn, "WHERE orders.status = 'open'"), vec![1]);
    assert_eq!(ids(&conn, "orders.total <> 40"), vec![1, 3, 4, 5]);
}

#[test]
fn membership_and_range() {
    let conn = setup_db();
    assert_eq!(ids(&conn, "orders.status IN ('open', 'held')"), vec![1, 2]);
    assert_eq!(ids(&conn, "orders.total BETWEEN 40 AND 120"), vec![1, 2, 4]);
    assert_eq!(
        ids(&conn, "orders.total NOT BETWEEN 40 AND 120"),
        vec![3, 5]
    );
}

#[test]
fn pattern_and_null() {
    let conn = setup_db();
    assert_eq!(ids(&conn, "orders.status LIKE 'sh%'"), vec![3]);
    assert_eq!(ids(&conn, "orders.status IS NULL"), vec![4]);
    assert_eq!(ids(&conn, "orders.status IS NOT NULL"), vec![1, 2, 3, 5]);
}

#[test]
fn boolean_combinations() {
    let conn = setup_db();
    assert_eq!(
        ids(
            &conn,
            "(orders.status = 'open' OR orders.status = 'held') AND orders.total > 50"
        ),
        vec![1]
    );
    assert_eq!(ids(&conn, "NOT (orders.total > 50)"), vec![2, 5]);
}

#[test]
fn where_inside_literal() {
    let conn = setup_db();
    assert_eq!(ids(&conn, "where orders.status = 'somewhere else';"), vec![5]);
}

#[test]
fn rejected_filter_never_reaches_database() {
    let conn = setup_db();
    let parser = parser();

    for fragment in [
        "orders.total > 0; DELETE FROM orders",
        "orders.total > 0 UNION SELECT 1",
        "orders.status = 'x' OR 1 = 1",
        "orders.total = 'lots'",
        "orders.status ILIKE 'OPEN'",
    ] {
        assert!(
            parser.parse_and_attach(fragment, select("orders")).is_err(),
            "{fragment} should be rejected"
        );
    }

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 5);
}
