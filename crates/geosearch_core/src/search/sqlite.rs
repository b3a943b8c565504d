//! SQLite execution of distance queries.
//!
//! # Responsibility
//! - Render a [`DistanceQuery`] into one parameterized statement.
//! - Bind geometry parameters through the point/cube codecs.
//! - Interrupt the statement on cancellation or deadline.
//!
//! # Invariants
//! - The center point is bound once and shared by the projection and filter.
//! - The projected `distance` column is the value the rows are ordered by.

use super::error::{SearchError, SearchOutcome};
use super::hit::SearchHit;
use super::query::{DistanceQuery, Predicate, SortKey, SortOrder};
use super::store::{ExecutionControl, PlaceStore};
use crate::geometry::{decode_point, encode_box, encode_point, GeoPoint, GeometryDecodeError};
use crate::repo::place_repo::{parse_place_row, PLACE_COLUMNS_SQL};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::time::Instant;

/// VM instructions between progress-handler checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// Rendered statement with positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders the query against the `places` table.
///
/// # Errors
/// - `SearchError::Encode` when a geometry parameter is not finite.
pub fn render_distance_query(query: &DistanceQuery) -> SearchOutcome<SqlStatement> {
    let mut writer = SqlWriter::new(query.center())?;

    let distance_expr = writer.distance_expr(query.center())?;
    let where_sql = writer.predicate(query.predicate())?;
    let order_sql = query
        .order_by()
        .iter()
        .map(|order| {
            let column = match order.key {
                SortKey::Distance => "distance",
                SortKey::CreatedAt => "places.created_at",
                SortKey::PlaceId => "places.place_id",
            };
            let direction = match order.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            format!("{column} {direction}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let pagination = query.pagination();
    let limit = writer.bind(Value::Integer(i64::from(pagination.limit)));
    let offset = writer.bind(Value::Integer(i64::from(pagination.offset)));

    let mut sql = format!(
        "SELECT {PLACE_COLUMNS_SQL},
    {distance_expr} AS distance
FROM places
WHERE {where_sql}"
    );
    if !order_sql.is_empty() {
        sql.push_str(&format!("\nORDER BY {order_sql}"));
    }
    sql.push_str(&format!("\nLIMIT {limit} OFFSET {offset}"));

    Ok(SqlStatement {
        sql,
        params: writer.params,
    })
}

struct SqlWriter {
    params: Vec<Value>,
    center: GeoPoint,
    center_slot: String,
}

impl SqlWriter {
    fn new(center: &GeoPoint) -> SearchOutcome<Self> {
        let mut writer = Self {
            params: Vec::new(),
            center: *center,
            center_slot: String::new(),
        };
        writer.center_slot = writer.bind(Value::Text(encode_point(center)?));
        Ok(writer)
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn distance_expr(&mut self, from: &GeoPoint) -> SearchOutcome<String> {
        let slot = if *from == self.center {
            self.center_slot.clone()
        } else {
            self.bind(Value::Text(encode_point(from)?))
        };
        Ok(format!("earth_distance({slot}, places.earth)"))
    }

    fn predicate(&mut self, predicate: &Predicate) -> SearchOutcome<String> {
        match predicate {
            Predicate::ActiveIs(active) => {
                let slot = self.bind(Value::Integer(i64::from(*active)));
                Ok(format!("places.active = {slot}"))
            }
            Predicate::DistanceWithin { center, radius_m } => {
                let expr = self.distance_expr(center)?;
                let slot = self.bind(Value::Real(*radius_m));
                Ok(format!("{expr} <= {slot}"))
            }
            Predicate::BoxContainsEarth(bounds) => {
                let slot = self.bind(Value::Text(encode_box(bounds)?));
                Ok(format!("cube_contains({slot}, places.earth)"))
            }
            Predicate::And(parts) if parts.is_empty() => Ok("1 = 1".to_string()),
            Predicate::And(parts) => {
                let rendered = parts
                    .iter()
                    .map(|part| match part {
                        Predicate::And(_) => self.predicate(part).map(|sql| format!("({sql})")),
                        _ => self.predicate(part),
                    })
                    .collect::<SearchOutcome<Vec<_>>>()?;
                Ok(rendered.join("\n  AND "))
            }
        }
    }
}

/// Place store over a migrated core connection.
pub struct SqlitePlaceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn run(&self, statement: &SqlStatement) -> SearchOutcome<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
        let mut hits = Vec::new();

        while let Some(row) = rows.next()? {
            let distance: f64 = row.get("distance")?;
            let place = parse_place_row(row)?;
            hits.push(SearchHit { distance, place });
        }

        Ok(hits)
    }

    /// First stored `earth` value that does not decode as a point.
    ///
    /// SQL functions can only report decode failures as text, so a failed
    /// statement is re-checked here to recover the typed error.
    fn first_malformed_earth(&self) -> rusqlite::Result<Option<GeometryDecodeError>> {
        let mut stmt = self
            .conn
            .prepare("SELECT earth FROM places ORDER BY place_id;")?;
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            if let Err(err) = decode_point(&raw) {
                return Ok(Some(err));
            }
        }

        Ok(None)
    }

    fn explain_failure(&self, err: SearchError, control: &ExecutionControl) -> SearchError {
        let err = classify_interrupt(err, control);
        if !matches!(err, SearchError::QueryExecution(_)) {
            return err;
        }
        match self.first_malformed_earth() {
            Ok(Some(decode_err)) => SearchError::Decode(decode_err),
            _ => err,
        }
    }
}

impl PlaceStore for SqlitePlaceStore<'_> {
    fn describe(&self, query: &DistanceQuery) -> SearchOutcome<String> {
        Ok(render_distance_query(query)?.sql)
    }

    fn fetch(
        &self,
        query: &DistanceQuery,
        control: &ExecutionControl,
    ) -> SearchOutcome<Vec<SearchHit>> {
        let started_at = Instant::now();
        let statement = render_distance_query(query)?;
        control.check(started_at)?;

        let outcome = {
            let _guard = InterruptGuard::install(self.conn, control, started_at);
            self.run(&statement)
        };
        outcome.map_err(|err| self.explain_failure(err, control))
    }
}

/// Installs a progress handler for the guard's lifetime.
struct InterruptGuard<'conn> {
    conn: Option<&'conn Connection>,
}

impl<'conn> InterruptGuard<'conn> {
    fn install(conn: &'conn Connection, control: &ExecutionControl, started_at: Instant) -> Self {
        if control.is_unbounded() {
            return Self { conn: None };
        }

        let cancel = control.cancel.clone();
        let deadline = control.deadline(started_at);
        conn.progress_handler(
            PROGRESS_CHECK_OPS,
            Some(move || {
                cancel.as_ref().is_some_and(|token| token.is_cancelled())
                    || deadline.is_some_and(|deadline| Instant::now() >= deadline)
            }),
        );
        Self { conn: Some(conn) }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn {
            conn.progress_handler(0, None::<fn() -> bool>);
        }
    }
}

fn classify_interrupt(err: SearchError, control: &ExecutionControl) -> SearchError {
    if !is_interrupted(&err) {
        return err;
    }
    if control.is_cancelled() {
        return SearchError::Cancelled;
    }
    match control.timeout {
        Some(limit) => SearchError::Timeout { limit },
        None => err,
    }
}

fn is_interrupted(err: &SearchError) -> bool {
    match err {
        SearchError::QueryExecution(crate::db::DbError::Sqlite(
            rusqlite::Error::SqliteFailure(failure, _),
        )) => failure.code == ErrorCode::OperationInterrupted,
        _ => false,
    }
}
