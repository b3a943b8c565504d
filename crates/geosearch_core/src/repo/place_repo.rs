//! Place repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/list/activate APIs over the `places` table.
//! - Derive and persist the `earth` point column on every write.
//!
//! # Invariants
//! - Write paths must call `Place::validate()` before SQL mutations.
//! - `earth` always holds the encoded point for the row's latitude/longitude.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::place::{Place, PlaceId, PlaceValidationError};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub(crate) const PLACE_COLUMNS_SQL: &str = "places.place_id AS place_id,
    places.name AS name,
    places.address AS address,
    places.latitude AS latitude,
    places.longitude AS longitude,
    places.active AS active,
    places.created_at AS created_at,
    places.updated_at AS updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for place persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PlaceValidationError),
    Db(DbError),
    NotFound(PlaceId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "place not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted place data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<PlaceValidationError> for RepoError {
    fn from(value: PlaceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing places.
#[derive(Debug, Clone, Default)]
pub struct PlaceListQuery {
    pub include_inactive: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for place persistence.
pub trait PlaceRepository {
    fn create_place(&self, place: &Place) -> RepoResult<PlaceId>;
    fn get_place(&self, id: PlaceId) -> RepoResult<Option<Place>>;
    fn list_places(&self, query: &PlaceListQuery) -> RepoResult<Vec<Place>>;
    fn set_active(&self, id: PlaceId, active: bool) -> RepoResult<()>;
}

/// SQLite-backed place repository.
pub struct SqlitePlaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlaceRepository for SqlitePlaceRepository<'_> {
    fn create_place(&self, place: &Place) -> RepoResult<PlaceId> {
        place.validate()?;
        let earth = place.geo_point()?;

        self.conn.execute(
            "INSERT INTO places (
                place_id,
                name,
                address,
                latitude,
                longitude,
                earth,
                active,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                place.id.to_string(),
                place.name.as_str(),
                place.address.as_deref(),
                place.latitude,
                place.longitude,
                earth,
                place.active,
                place.created_at,
                place.updated_at,
            ],
        )?;

        info!(
            "event=place_create module=repo status=ok place_id={}",
            place.id
        );
        Ok(place.id)
    }

    fn get_place(&self, id: PlaceId) -> RepoResult<Option<Place>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLACE_COLUMNS_SQL} FROM places WHERE place_id = ?1;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_place_row(row)?));
        }

        Ok(None)
    }

    fn list_places(&self, query: &PlaceListQuery) -> RepoResult<Vec<Place>> {
        let mut sql = format!("SELECT {PLACE_COLUMNS_SQL} FROM places WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_inactive {
            sql.push_str(" AND places.active = 1");
        }

        sql.push_str(" ORDER BY places.created_at ASC, places.place_id ASC");

        match query.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
            }
            None => sql.push_str(" LIMIT -1 OFFSET ?"),
        }
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut places = Vec::new();

        while let Some(row) = rows.next()? {
            places.push(parse_place_row(row)?);
        }

        Ok(places)
    }

    fn set_active(&self, id: PlaceId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE places
             SET
                active = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE place_id = ?2;",
            params![active, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Parses the columns named by `PLACE_COLUMNS_SQL`.
pub(crate) fn parse_place_row(row: &Row<'_>) -> RepoResult<Place> {
    let id_text: String = row.get("place_id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in places.place_id"))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in places.active"
            )));
        }
    };

    let place = Place {
        id,
        name: row.get("name")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        active,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    place.validate()?;
    Ok(place)
}
