//! Geometry SQL functions registered on every core connection.
//!
//! # Responsibility
//! - Give SQLite the sphere operators the search query is written against.
//! - Decode geometry arguments through the point/cube codecs.
//!
//! # Invariants
//! - All functions are deterministic and side-effect free.
//! - Malformed geometry text fails the statement; it never yields a default.
//!
//! | function                   | result                                     |
//! |----------------------------|--------------------------------------------|
//! | `earth()`                  | sphere radius in meters                    |
//! | `ll_to_earth(lat, lon)`    | point text                                 |
//! | `latitude(point)`          | degrees                                    |
//! | `longitude(point)`         | degrees                                    |
//! | `earth_distance(a, b)`     | great-circle meters                        |
//! | `earth_box(point, meters)` | cube text, half-width `meters` per axis    |
//! | `cube_contains(cube, pt)`  | `1` when the point is inside, else `0`     |

use crate::geometry::{BoundingBox, GeoPoint, EARTH_RADIUS_METERS};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;

/// Registers the geometry function set on `conn`.
pub fn register_geometry_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("earth", 0, flags, sql_earth)?;
    conn.create_scalar_function("ll_to_earth", 2, flags, sql_ll_to_earth)?;
    conn.create_scalar_function("latitude", 1, flags, sql_latitude)?;
    conn.create_scalar_function("longitude", 1, flags, sql_longitude)?;
    conn.create_scalar_function("earth_distance", 2, flags, sql_earth_distance)?;
    conn.create_scalar_function("earth_box", 2, flags, sql_earth_box)?;
    conn.create_scalar_function("cube_contains", 2, flags, sql_cube_contains)?;
    Ok(())
}

fn sql_earth(_ctx: &Context<'_>) -> rusqlite::Result<f64> {
    Ok(EARTH_RADIUS_METERS)
}

fn sql_ll_to_earth(ctx: &Context<'_>) -> rusqlite::Result<GeoPoint> {
    let latitude: f64 = ctx.get(0)?;
    let longitude: f64 = ctx.get(1)?;
    GeoPoint::from_lat_lon(latitude, longitude)
        .map_err(|err| rusqlite::Error::UserFunctionError(Box::new(err)))
}

fn sql_latitude(ctx: &Context<'_>) -> rusqlite::Result<f64> {
    Ok(ctx.get::<GeoPoint>(0)?.latitude())
}

fn sql_longitude(ctx: &Context<'_>) -> rusqlite::Result<f64> {
    Ok(ctx.get::<GeoPoint>(0)?.longitude())
}

fn sql_earth_distance(ctx: &Context<'_>) -> rusqlite::Result<f64> {
    let from: GeoPoint = ctx.get(0)?;
    let to: GeoPoint = ctx.get(1)?;
    Ok(from.great_circle_distance(&to))
}

fn sql_earth_box(ctx: &Context<'_>) -> rusqlite::Result<BoundingBox> {
    let center: GeoPoint = ctx.get(0)?;
    let half_width: f64 = ctx.get(1)?;
    Ok(BoundingBox::around(&center, half_width))
}

fn sql_cube_contains(ctx: &Context<'_>) -> rusqlite::Result<bool> {
    let bounds: BoundingBox = ctx.get(0)?;
    let point: GeoPoint = ctx.get(1)?;
    Ok(bounds.contains(&point))
}
