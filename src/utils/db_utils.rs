use sqlx::MySqlPool;

/// A bindable column value for dynamic statements.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds `UPDATE table SET a = ?, b = ? WHERE id_column = ?` for the given
/// columns. `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if columns.is_empty() {
        return None;
    }

    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, v)| v).collect();
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_clause_in_column_order() {
        let update = build_update_sql(
            "workers",
            vec![
                ("email", SqlValue::String("ana@school.cl".into())),
                ("job_title", SqlValue::String("Inspector".into())),
            ],
            "id",
            7,
        )
        .expect("columns present");

        assert_eq!(update.sql, "UPDATE workers SET email = ?, job_title = ? WHERE id = ?");
        assert_eq!(update.values.last(), Some(&SqlValue::U64(7)));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn nothing_to_set() {
        assert!(build_update_sql("workers", Vec::new(), "id", 7).is_none());
    }
}
