use rust_decimal::Decimal;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I32(i32),
    Decimal(Decimal),
    Null,
}

/// ===============================
/// Partial UPDATE builder
/// ===============================
/// Column names are `&'static str` so only code can choose them; request
/// data only ever reaches the bound values.
#[derive(Debug)]
pub struct SqlUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
}

impl SqlUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        self.assignments.push((column, value));
        self
    }

    pub fn set_opt(&mut self, column: &'static str, value: Option<SqlValue>) -> &mut Self {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn to_sql(&self, id_column: &str) -> String {
        let set_clause = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");

        format!("UPDATE {} SET {} WHERE {} = ?", self.table, set_clause, id_column)
    }
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    pool: &MySqlPool,
    update: SqlUpdate,
    id_column: &str,
    id_value: u64,
) -> Result<u64, sqlx::Error> {
    let sql = update.to_sql(id_column);
    let mut query = sqlx::query(&sql);

    for (_, value) in update.assignments {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I32(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.bind(id_value).execute(pool).await?;
    Ok(result.rows_affected())
}
