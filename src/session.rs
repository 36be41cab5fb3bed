//! The database session. It owns the sole PostgreSQL connection for the
//! process lifetime and mediates all statement execution: run a mutating
//! statement, run a query and print it as a table, run a query and collect
//! the rows as text, or run a presence check. All statements take bind
//! parameters; user input is never concatenated into SQL text.

use std::io::Write;

use itertools::Itertools as _;
use log::debug;
use postgres::types::{ToSql, Type};
use postgres::{NoTls, Row};

use crate::error::{Error, Result};

/// Bind parameters for a statement.
pub type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// A database session. The session moves from unopened to open to closed;
/// closed is terminal, and reopening requires a new session. Every query
/// result is fully materialized before the call returns, so no row handle
/// outlives the call that produced it.
pub struct Session {
    /// The connection, present while the session is open.
    client: Option<postgres::Client>,
}

impl Session {
    /// Connects to the given database. Connection failures are fatal:
    /// callers should report the error and terminate, not retry.
    pub fn connect(
        host: &str,
        port: u16,
        dbname: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let mut config = postgres::Config::new();
        config.host(host).port(port).dbname(dbname).user(user);
        if !password.is_empty() {
            config.password(password);
        }
        let client = config.connect(NoTls).map_err(|err| Error::Connection(err.to_string()))?;
        Ok(Self { client: Some(client) })
    }

    /// Closes the session, releasing the connection. Safe to call when
    /// already closed; never errors.
    pub fn close(&mut self) {
        self.client = None;
    }

    /// Executes a mutating statement (insert, update or delete) and returns
    /// the number of rows affected, discarding any result set. Each call is
    /// its own implicit unit of work; there is no transaction wrapping.
    pub fn execute(&mut self, statement: &str, params: Params) -> Result<u64> {
        debug!("executing: {statement}");
        Ok(self.client()?.execute(statement, params)?)
    }

    /// Runs a query and prints it to stdout as a tab-delimited table, with
    /// a header line of column names before the first row. Returns the
    /// number of rows printed. An empty result prints nothing.
    pub fn query_print(&mut self, statement: &str, params: Params) -> Result<u64> {
        let rows = self.rows(statement, params)?;
        let columns: Vec<&str> =
            rows.first().map_or(Vec::new(), |row| row.columns().iter().map(|c| c.name()).collect());
        let values = rows.iter().map(format_row).collect::<Result<Vec<_>>>()?;
        let mut stdout = std::io::stdout().lock();
        write_table(&mut stdout, &columns, values.into_iter())
    }

    /// Runs a query and returns a detached in-memory copy of all rows, with
    /// every value rendered as text (NULL for SQL NULLs). An empty result
    /// returns an empty vector, not an error.
    pub fn query_collect(&mut self, statement: &str, params: Params) -> Result<Vec<Vec<String>>> {
        self.rows(statement, params)?.iter().map(format_row).collect()
    }

    /// Runs a query and reports whether at least one row matched. This is a
    /// presence check, not a count: callers that need a true count must run
    /// a COUNT(*) query via query_collect().
    pub fn query_exists(&mut self, statement: &str, params: Params) -> Result<bool> {
        Ok(!self.rows(statement, params)?.is_empty())
    }

    /// Runs a query, returning the materialized rows.
    fn rows(&mut self, statement: &str, params: Params) -> Result<Vec<Row>> {
        debug!("querying: {statement}");
        Ok(self.client()?.query(statement, params)?)
    }

    /// Returns the open connection, or errors if the session is closed.
    fn client(&mut self) -> Result<&mut postgres::Client> {
        self.client.as_mut().ok_or_else(|| Error::Statement("session is closed".to_string()))
    }

    /// Creates a session that was closed without ever connecting.
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        Self { client: None }
    }
}

/// Writes rows as a tab-delimited table, with the column names once before
/// the first row, returning the number of rows written. Printing and
/// counting happen in a single pass, and the count always equals the number
/// of lines written after the header.
fn write_table<W: Write>(
    w: &mut W,
    columns: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        if count == 0 {
            writeln!(w, "{}", columns.iter().join("\t"))?;
        }
        writeln!(w, "{}", row.iter().join("\t"))?;
        count += 1;
    }
    Ok(count)
}

/// Renders a row as text values.
fn format_row(row: &Row) -> Result<Vec<String>> {
    (0..row.len()).map(|i| format_value(row, i)).collect()
}

/// Renders a single column value as text, or NULL for a SQL NULL.
fn format_value(row: &Row, i: usize) -> Result<String> {
    /// Formats an optional value, or NULL if there is none.
    fn opt(value: Option<impl std::fmt::Display>) -> String {
        value.map_or("NULL".to_string(), |v| v.to_string())
    }
    Ok(match row.columns()[i].type_() {
        ty if *ty == Type::BOOL => opt(row.try_get::<_, Option<bool>>(i)?),
        ty if *ty == Type::INT2 => opt(row.try_get::<_, Option<i16>>(i)?),
        ty if *ty == Type::INT4 => opt(row.try_get::<_, Option<i32>>(i)?),
        ty if *ty == Type::INT8 => opt(row.try_get::<_, Option<i64>>(i)?),
        ty if *ty == Type::FLOAT4 => opt(row.try_get::<_, Option<f32>>(i)?),
        ty if *ty == Type::FLOAT8 => opt(row.try_get::<_, Option<f64>>(i)?),
        ty if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME => {
            opt(row.try_get::<_, Option<String>>(i)?)
        }
        ty if *ty == Type::DATE => opt(row.try_get::<_, Option<chrono::NaiveDate>>(i)?),
        ty if *ty == Type::TIME => opt(row.try_get::<_, Option<chrono::NaiveTime>>(i)?),
        ty if *ty == Type::TIMESTAMP => opt(row.try_get::<_, Option<chrono::NaiveDateTime>>(i)?),
        ty => return Err(Error::Statement(format!("unsupported column type {ty}"))),
    })
}
