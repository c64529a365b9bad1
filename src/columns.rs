//! Ready-made handlers for Sea-ORM columns.
//!
//! These cover the common "parameter equals column", "parameter is a search
//! term" and "two parameters bound a column" cases so resource filters only
//! hand-write the unusual ones.

use crate::errors::FilterError;
use crate::params::is_falsy;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{
    ColumnTrait, ColumnType, QueryFilter,
    sea_query::{Alias, ConditionalStatement, Expr, Func, IntoCondition, SimpleExpr},
};
use serde_json::Value;
use uuid::Uuid;

// Basic safety limit, longer values are rejected rather than bound
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Add a condition to a query builder in place.
pub trait Constrain {
    fn constrain<C: IntoCondition>(&mut self, condition: C);
}

impl<T: QueryFilter> Constrain for T {
    fn constrain<C: IntoCondition>(&mut self, condition: C) {
        QueryFilter::query(self).cond_where(condition);
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Convert a scalar parameter value into a SQL value of the column's type.
///
/// Query-string values always arrive as strings, so the column type decides
/// what gets bound: integers as `i64`, floats and decimals as `f64`, dates and
/// timestamps as chrono values, UUIDs as UUIDs and everything else as text.
/// Values that do not parse for the column type are rejected.
pub fn to_sql_value(
    column_type: &ColumnType,
    parameter: &str,
    value: &Value,
) -> Result<sea_orm::Value, FilterError> {
    let invalid = |expected: &str| FilterError::invalid_value(parameter, format!("expected {expected}"));

    let text = match value {
        Value::String(s) if s.len() > MAX_FIELD_VALUE_LENGTH => {
            return Err(FilterError::invalid_value(parameter, "value is too long"));
        }
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            return Err(invalid("a scalar value"));
        }
    };

    match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => text
            .parse::<i64>()
            .map(sea_orm::Value::from)
            .map_err(|_| invalid("an integer")),
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) | ColumnType::Money(_) => {
            text.parse::<f64>()
                .map(sea_orm::Value::from)
                .map_err(|_| invalid("a number"))
        }
        ColumnType::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(sea_orm::Value::from(true)),
            "false" | "0" => Ok(sea_orm::Value::from(false)),
            _ => Err(invalid("a boolean")),
        },
        ColumnType::Date => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(sea_orm::Value::from)
            .map_err(|_| invalid("a date (YYYY-MM-DD)")),
        ColumnType::Time => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(&text, format).ok())
            .map(sea_orm::Value::from)
            .ok_or_else(|| invalid("a time (HH:MM:SS)")),
        ColumnType::DateTime | ColumnType::Timestamp => parse_datetime(&text)
            .map(sea_orm::Value::from)
            .ok_or_else(|| invalid("a date or datetime")),
        ColumnType::TimestampWithTimeZone => DateTime::parse_from_rfc3339(&text)
            .ok()
            .or_else(|| parse_datetime(&text).map(|naive| naive.and_utc().fixed_offset()))
            .map(sea_orm::Value::from)
            .ok_or_else(|| invalid("a date or RFC 3339 timestamp")),
        ColumnType::Uuid => Uuid::parse_str(&text)
            .map(sea_orm::Value::from)
            .map_err(|_| invalid("a UUID")),
        _ => Ok(sea_orm::Value::from(text)),
    }
}

/// Accepts a bare date (midnight) or one of [`DATETIME_FORMATS`].
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn scalar<C: ColumnTrait>(column: C, value: &Value) -> Result<sea_orm::Value, FilterError> {
    to_sql_value(column.def().get_column_type(), column.as_str(), value)
}

fn is_text(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::String(_) | ColumnType::Char(_) | ColumnType::Text
    )
}

fn column_name<C: ColumnTrait>(column: C) -> String {
    column.as_str().to_string()
}

/// `column = value`, or `column IN (...)` for arrays. A missing value is a no-op.
pub fn exact<Q, C>(column: C) -> impl Fn(&mut Q, Option<&Value>) -> Result<(), FilterError> + Send + Sync + 'static
where
    Q: Constrain + 'static,
    C: ColumnTrait + Send + Sync,
{
    move |query, value| {
        let Some(value) = value else {
            return Ok(());
        };

        if let Value::Array(items) = value {
            let values = items
                .iter()
                .filter(|item| !is_falsy(item))
                .map(|item| scalar(column, item))
                .collect::<Result<Vec<_>, _>>()?;
            if !values.is_empty() {
                query.constrain(column.is_in(values));
            }
            return Ok(());
        }

        query.constrain(column.eq(scalar(column, value)?));
        Ok(())
    }
}

/// Case-insensitive substring match: `UPPER(column) LIKE '%VALUE%'`.
///
/// Non-text columns are cast to `TEXT` first so the match works on numbers
/// and UUIDs. The cast target is Postgres/SQLite syntax; on MySQL use this
/// handler on text columns only.
pub fn contains<Q, C>(column: C) -> impl Fn(&mut Q, Option<&Value>) -> Result<(), FilterError> + Send + Sync + 'static
where
    Q: Constrain + 'static,
    C: ColumnTrait + Send + Sync,
{
    move |query, value| {
        let Some(value) = value else {
            return Ok(());
        };
        let Value::String(term) = value else {
            return Err(FilterError::invalid_value(
                column_name(column),
                "expected a search string",
            ));
        };
        if term.len() > MAX_FIELD_VALUE_LENGTH {
            return Err(FilterError::invalid_value(column_name(column), "value is too long"));
        }

        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let target: SimpleExpr = if is_text(column.def().get_column_type()) {
            Expr::col((column.entity_name(), column)).into()
        } else {
            Expr::col((column.entity_name(), column)).cast_as(Alias::new("TEXT"))
        };
        let pattern = format!("%{}%", term.to_uppercase());
        query.constrain(Expr::expr(Func::upper(target)).like(pattern));
        Ok(())
    }
}

/// Range handler: `column >= lower AND column <= upper`, skipping falsy bounds.
pub fn between<Q, C>(
    column: C,
) -> impl Fn(&mut Q, Option<&Value>, Option<&Value>) -> Result<(), FilterError> + Send + Sync + 'static
where
    Q: Constrain + 'static,
    C: ColumnTrait + Send + Sync,
{
    move |query, lower, upper| {
        if let Some(lower) = lower.filter(|value| !is_falsy(value)) {
            query.constrain(column.gte(scalar(column, lower)?));
        }
        if let Some(upper) = upper.filter(|value| !is_falsy(value)) {
            query.constrain(column.lte(scalar(column, upper)?));
        }
        Ok(())
    }
}
