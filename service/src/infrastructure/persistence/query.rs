//! Small parameterized SELECT builder for the tutorials table. Conditions
//! produce `$n` placeholders and a parallel parameter list that is bound in
//! order.

use chrono::{DateTime, Utc};
use sqlx::types::uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum Order {
    Descending,
}

impl Order {
    fn as_sql(&self) -> &'static str {
        match self {
            Order::Descending => "DESC",
        }
    }
}

#[derive(Debug)]
pub enum Condition<'a> {
    /// `column = $n`
    Equals {
        column: &'a str,
        value: SqlParameter,
    },
    /// Keyset pagination: `(first, second) < ($n, $n+1)`. Row-value
    /// comparison keeps the cursor strict under the composite descending
    /// order.
    KeysetBefore {
        columns: (&'a str, &'a str),
        values: (SqlParameter, SqlParameter),
    },
}

pub struct SelectBuilder<'a> {
    table: &'a str,
    columns: Vec<&'a str>,
    conditions: Vec<Condition<'a>>,
    order_by: Vec<(&'a str, Order)>,
    limit: Option<i64>,
}

impl<'a> SelectBuilder<'a> {
    pub fn from_table(table: &'a str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: Vec<&'a str>) -> Self {
        self.columns = columns;
        self
    }

    pub fn where_condition(mut self, condition: Condition<'a>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, column: &'a str, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> (String, Vec<SqlParameter>) {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("\"{}\"", column))
            .collect();

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), self.table);

        let mut param_counter = 1usize;
        let mut params = Vec::new();
        if !self.conditions.is_empty() {
            let mut where_sql = Vec::new();
            for condition in self.conditions {
                let (cond_sql, cond_params) = condition.to_sql(&mut param_counter);
                where_sql.push(cond_sql);
                params.extend(cond_params);
            }
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let order_sql: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("\"{}\" {}", column, order.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_sql.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }
}

impl<'a> Condition<'a> {
    fn to_sql(self, param_counter: &mut usize) -> (String, Vec<SqlParameter>) {
        match self {
            Condition::Equals { column, value } => {
                let sql = format!("\"{}\" = ${}", column, param_counter);
                *param_counter += 1;
                (sql, vec![value])
            }
            Condition::KeysetBefore { columns, values } => {
                let sql = format!(
                    "(\"{}\", \"{}\") < (${}, ${})",
                    columns.0,
                    columns.1,
                    *param_counter,
                    *param_counter + 1
                );
                *param_counter += 2;
                (sql, vec![values.0, values.1])
            }
        }
    }
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone)]
pub enum SqlParameter {
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        match self {
            SqlParameter::Text(s) => query.bind(s),
            SqlParameter::Boolean(b) => query.bind(b),
            SqlParameter::Timestamp(t) => query.bind(t),
            SqlParameter::Uuid(u) => query.bind(u),
        }
    }
}
