//! Shared row-decoding helpers. SQLite has no decimal type, so monetary
//! columns are scale-2 strings decoded through `rust_decimal`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;

pub(crate) fn decimal_column(row: &SqliteRow, name: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(name)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: name.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn opt_decimal_column(
    row: &SqliteRow,
    name: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(name)?;
    raw.map(|r| {
        Decimal::from_str(&r).map_err(|e| sqlx::Error::ColumnDecode {
            index: name.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

pub(crate) fn parsed_column<T>(row: &SqliteRow, name: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(name)?;
    raw.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: name.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn date_column(row: &SqliteRow, name: &str) -> Result<NaiveDate, sqlx::Error> {
    row.try_get(name)
}
