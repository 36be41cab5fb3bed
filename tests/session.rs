//! Session integration tests. Most of these need a real PostgreSQL server:
//! set TIXQL_TEST_DBNAME (and optionally TIXQL_TEST_HOST, TIXQL_TEST_PORT,
//! TIXQL_TEST_USER, TIXQL_TEST_PASSWORD) to run them, otherwise they are
//! skipped. They only create temporary tables, which are dropped with the
//! connection.

use pretty_assertions::assert_eq;
use tixql::{Error, Session};

/// Connects a test session, or skips the test when no server is configured.
fn session() -> Option<Session> {
    let Ok(dbname) = std::env::var("TIXQL_TEST_DBNAME") else {
        eprintln!("skipping: TIXQL_TEST_DBNAME is not set");
        return None;
    };
    let host = std::env::var("TIXQL_TEST_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("TIXQL_TEST_PORT")
        .unwrap_or_else(|_| "5432".to_string())
        .parse()
        .expect("invalid TIXQL_TEST_PORT");
    let user = std::env::var("TIXQL_TEST_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("TIXQL_TEST_PASSWORD").unwrap_or_default();
    Some(Session::connect(&host, port, &dbname, &user, &password).expect("connect failed"))
}

#[test]
fn connect_unreachable_endpoint() {
    // Port 1 is never a PostgreSQL server. No session is returned, and the
    // error kind tells the caller to terminate.
    let result = Session::connect("localhost", 1, "tickets", "nobody", "");
    assert!(matches!(result, Err(Error::Connection(_))), "expected a connection error");
}

#[test]
fn execute_persists_changes() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (id INT PRIMARY KEY, name TEXT)", &[]).unwrap();
    assert_eq!(
        session.execute("INSERT INTO t VALUES ($1, $2), ($3, $4)", &[&1, &"a", &2, &"b"]).unwrap(),
        2
    );
    assert_eq!(
        session.query_collect("SELECT id, name FROM t ORDER BY id", &[]).unwrap(),
        vec![
            vec!["1".to_string(), "a".to_string()],
            vec!["2".to_string(), "b".to_string()]
        ]
    );
}

#[test]
fn execute_duplicate_key_leaves_prior_rows() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (id INT PRIMARY KEY)", &[]).unwrap();
    session.execute("INSERT INTO t VALUES ($1)", &[&1]).unwrap();
    let result = session.execute("INSERT INTO t VALUES ($1)", &[&1]);
    assert!(matches!(result, Err(Error::Statement(_))), "expected a statement error");
    assert_eq!(session.query_collect("SELECT id FROM t", &[]).unwrap(), vec![vec!["1".to_string()]]);
}

#[test]
fn query_collect_empty_table() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (a INT, b TEXT)", &[]).unwrap();
    assert_eq!(session.query_collect("SELECT a, b FROM t", &[]).unwrap(), Vec::<Vec<String>>::new());
}

#[test]
fn query_collect_shape_and_nulls() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (a INT, b TEXT, c DATE)", &[]).unwrap();
    session.execute("INSERT INTO t VALUES (1, NULL, '2020-03-14'), (NULL, 'x', NULL)", &[]).unwrap();
    let rows = session.query_collect("SELECT a, b, c FROM t ORDER BY a", &[]).unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), 3);
    }
    assert_eq!(
        rows,
        vec![
            vec!["1".to_string(), "NULL".to_string(), "2020-03-14".to_string()],
            vec!["NULL".to_string(), "x".to_string(), "NULL".to_string()],
        ]
    );
}

#[test]
fn query_exists_is_presence_only() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (id INT)", &[]).unwrap();
    assert!(!session.query_exists("SELECT id FROM t", &[]).unwrap());
    session.execute("INSERT INTO t SELECT generate_series(1, 1000)", &[]).unwrap();
    // A thousand matches and one match are indistinguishable.
    assert!(session.query_exists("SELECT id FROM t", &[]).unwrap());
    assert!(session.query_exists("SELECT id FROM t WHERE id = $1", &[&1]).unwrap());
    assert!(!session.query_exists("SELECT id FROM t WHERE id = $1", &[&1001]).unwrap());
}

#[test]
fn query_print_counts_rows() {
    let Some(mut session) = session() else { return };
    session.execute("CREATE TEMP TABLE t (id INT)", &[]).unwrap();
    assert_eq!(session.query_print("SELECT id FROM t", &[]).unwrap(), 0);
    session.execute("INSERT INTO t SELECT generate_series(1, 5)", &[]).unwrap();
    assert_eq!(session.query_print("SELECT id FROM t", &[]).unwrap(), 5);
}

#[test]
fn close_is_idempotent_and_terminal() {
    let Some(mut session) = session() else { return };
    session.close();
    session.close();
    let result = session.query_collect("SELECT 1", &[]);
    assert!(matches!(result, Err(Error::Statement(_))), "expected a statement error");
}
