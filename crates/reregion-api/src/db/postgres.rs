//! Postgres implementation of [`DataSource`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row as _, TypeInfo};

use reregion_cache::DataSource;
use reregion_core::{Dataset, Row, SourceError, Value};

const STATE_CENSUS: &str = include_str!("sql/state_census.sql");
const STATE_TAX: &str = include_str!("sql/state_tax.sql");
const FEDERAL_TAX: &str = include_str!("sql/federal_tax.sql");
const COUNTY_BY_ID: &str = include_str!("sql/county_by_id.sql");
const COUNTY_BY_NAME: &str = include_str!("sql/county_by_name.sql");
const COUNTY_LIST: &str = include_str!("sql/county_list.sql");
const METRIC_NAMES: &str = include_str!("sql/metric_names.sql");

/// Reads reference rows from Postgres.
///
/// The county list query takes the metric as a column name. It is only
/// substituted after [`PgSource::load_metric_names`] has confirmed it.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, dataset: Dataset, sql: &str) -> Result<Vec<Row>, SourceError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(dataset, e))?;
        decode_rows(dataset, &rows)
    }
}

fn query_error(dataset: Dataset, e: sqlx::Error) -> SourceError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            SourceError::Connection(e.to_string())
        }
        other => SourceError::Query {
            dataset,
            message: other.to_string(),
        },
    }
}

fn decode_rows(dataset: Dataset, rows: &[PgRow]) -> Result<Vec<Row>, SourceError> {
    if rows.is_empty() {
        return Err(SourceError::NoRows { dataset });
    }
    rows.iter().map(|row| decode_row(dataset, row)).collect()
}

/// Decode every column by its Postgres type name.
fn decode_row(dataset: Dataset, row: &PgRow) -> Result<Row, SourceError> {
    let decode_err = |e: sqlx::Error| SourceError::Decode {
        dataset,
        message: e.to_string(),
    };
    row.columns()
        .iter()
        .map(|col| {
            let i = col.ordinal();
            let value = match col.type_info().name() {
                "INT8" => row.try_get::<Option<i64>, _>(i).map_err(decode_err)?.map(Value::Int),
                "INT4" => row
                    .try_get::<Option<i32>, _>(i)
                    .map_err(decode_err)?
                    .map(|v| Value::Int(i64::from(v))),
                "INT2" => row
                    .try_get::<Option<i16>, _>(i)
                    .map_err(decode_err)?
                    .map(|v| Value::Int(i64::from(v))),
                "FLOAT8" => row.try_get::<Option<f64>, _>(i).map_err(decode_err)?.map(Value::Float),
                "FLOAT4" => row
                    .try_get::<Option<f32>, _>(i)
                    .map_err(decode_err)?
                    .map(|v| Value::Float(f64::from(v))),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                    row.try_get::<Option<String>, _>(i).map_err(decode_err)?.map(Value::Text)
                }
                other => {
                    return Err(SourceError::Decode {
                        dataset,
                        message: format!("column {} has unsupported type {other}", col.name()),
                    })
                }
            };
            Ok(value.unwrap_or(Value::Null))
        })
        .collect()
}

/// Substitute a validated metric column and sort direction into the county
/// list query.
fn county_list_sql(metric: &str, desc: bool) -> String {
    let order = if desc { "DESC" } else { "ASC" };
    COUNTY_LIST
        .replace("{metric}", &format!("\"{metric}\""))
        .replace("{order}", order)
}

#[async_trait]
impl DataSource for PgSource {
    async fn load_state_census(&self) -> Result<Vec<Row>, SourceError> {
        self.fetch(Dataset::StateCensus, STATE_CENSUS).await
    }

    async fn load_state_tax(&self) -> Result<Vec<Row>, SourceError> {
        self.fetch(Dataset::StateTax, STATE_TAX).await
    }

    async fn load_federal_tax(&self) -> Result<Vec<Row>, SourceError> {
        self.fetch(Dataset::FederalTax, FEDERAL_TAX).await
    }

    async fn load_county_by_id(&self, county_id: i64) -> Result<Vec<Row>, SourceError> {
        let rows = sqlx::query(COUNTY_BY_ID)
            .bind(county_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(Dataset::County, e))?;
        decode_rows(Dataset::County, &rows)
    }

    async fn load_county_by_name(&self, county_name: &str) -> Result<Vec<Row>, SourceError> {
        let rows = sqlx::query(COUNTY_BY_NAME)
            .bind(county_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(Dataset::County, e))?;
        decode_rows(Dataset::County, &rows)
    }

    async fn load_county_list(
        &self,
        metric: &str,
        n: usize,
        desc: bool,
    ) -> Result<Vec<Row>, SourceError> {
        let valid = self.load_metric_names().await?;
        if !valid.contains(metric) || metric.contains('"') {
            return Err(SourceError::UnknownMetric(metric.to_string()));
        }
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let rows = sqlx::query(&county_list_sql(metric, desc))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(Dataset::CountyList, e))?;
        decode_rows(Dataset::CountyList, &rows)
    }

    async fn load_metric_names(&self) -> Result<BTreeSet<String>, SourceError> {
        let rows = self.fetch(Dataset::MetricNames, METRIC_NAMES).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn county_list_sql_quotes_metric_and_sets_order() {
        let sql = county_list_sql("median_income", true);
        assert!(sql.contains("cc.\"median_income\"::int8"));
        assert!(sql.contains("ORDER BY cc.\"median_income\" DESC, c.county_id DESC"));
        assert!(!sql.contains("{metric}"));

        let sql = county_list_sql("pop", false);
        assert!(sql.contains("ASC"));
        assert!(!sql.contains("DESC"));
    }

    #[test]
    fn embedded_queries_are_present() {
        for sql in [STATE_CENSUS, STATE_TAX, FEDERAL_TAX, COUNTY_BY_ID, COUNTY_BY_NAME, METRIC_NAMES] {
            assert!(sql.trim_start().starts_with("SELECT"));
        }
        assert!(COUNTY_BY_ID.contains("$1"));
        assert!(COUNTY_LIST.contains("LIMIT $1"));
    }

    #[test]
    fn connection_failures_are_classified() {
        let err = query_error(Dataset::County, sqlx::Error::PoolTimedOut);
        assert!(matches!(err, SourceError::Connection(_)));
        let err = query_error(Dataset::County, sqlx::Error::RowNotFound);
        assert!(matches!(err, SourceError::Query { dataset: Dataset::County, .. }));
    }
}
