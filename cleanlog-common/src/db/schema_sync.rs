//! Declarative schema synchronization
//!
//! Each table is described once in code as a list of columns. On startup:
//! 1. **CREATE TABLE IF NOT EXISTS** builds the table from that list
//! 2. **Auto-Sync** adds any column the live table is missing
//!
//! Old rows are never backfilled; a newly added column reads back as its
//! DEFAULT (or NULL when it has none). Type and constraint drift is reported
//! but left alone, since SQLite cannot alter either in place.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g. "TEXT", "INTEGER", "BOOLEAN", "TIMESTAMP")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
    /// DEFAULT expression, already quoted where needed (e.g. `'requested'`)
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            autoincrement: false,
            default_value: None,
        }
    }

    /// `INTEGER PRIMARY KEY AUTOINCREMENT`: ids are never reused
    pub fn autoincrement_key(mut self) -> Self {
        self.primary_key = true;
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Column clause as used inside CREATE TABLE
    fn create_clause(&self) -> String {
        let mut clause = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            clause.push_str(" PRIMARY KEY");
            if self.autoincrement {
                clause.push_str(" AUTOINCREMENT");
            }
        }
        if self.not_null {
            clause.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_value {
            clause.push_str(&format!(" DEFAULT {}", default));
        }
        clause
    }
}

/// Column as reported by `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub pk: bool,
}

/// Difference between the declared and live schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Column missing from database (auto-fixed)
    MissingColumn { table: String, column: ColumnDefinition },
    /// Declared type differs from live type (reported only)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Live column lacks a declared constraint (reported only)
    ConstraintMismatch {
        table: String,
        column: String,
        constraint: String,
    },
}

/// Declared schema for one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Columns in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// `CREATE TABLE IF NOT EXISTS` statement built from `expected_columns`
    fn create_table_sql() -> String {
        let columns: Vec<String> = Self::expected_columns()
            .iter()
            .map(ColumnDefinition::create_clause)
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            columns.join(",\n    ")
        )
    }
}

/// Reads the live schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Columns of `table_name` ordered by position
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", table_name))
            .fetch_all(pool)
            .await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
                not_null: row.get::<i32, _>("notnull") != 0,
                default_value: row.get("dflt_value"),
                pk: row.get::<i32, _>("pk") != 0,
            })
            .collect();
        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Compares declared and live schemas
pub struct SchemaDiff;

impl SchemaDiff {
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            let Some(actual_col) = actual
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&expected_col.name))
            else {
                drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.clone(),
                });
                continue;
            };

            if !Self::types_compatible(&expected_col.sql_type, &actual_col.type_name) {
                drift.push(SchemaDrift::TypeMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    expected: expected_col.sql_type.clone(),
                    actual: actual_col.type_name.clone(),
                });
            }

            if expected_col.not_null && !actual_col.not_null && !actual_col.pk {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "NOT NULL".to_string(),
                });
            }

            if expected_col.primary_key && !actual_col.pk {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "PRIMARY KEY".to_string(),
                });
            }
        }

        drift
    }

    /// SQLite type affinity comparison
    pub(crate) fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        let affinity = |t: &str| -> &'static str {
            if t.contains("INT") {
                "INTEGER"
            } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
                "TEXT"
            } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
                "REAL"
            } else if t.is_empty() || t.contains("BLOB") {
                "BLOB"
            } else {
                "NUMERIC"
            }
        };

        affinity(&exp) == affinity(&act)
    }
}

/// Applies declared schemas to the database
pub struct SchemaSync;

impl SchemaSync {
    /// Create the table if absent, then add any missing columns
    pub async fn sync_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
        let table_name = T::table_name();

        sqlx::query(&T::create_table_sql()).execute(pool).await?;

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &T::expected_columns(), &actual);

        if drift.is_empty() {
            info!("Schema up to date for '{}'", table_name);
            return Ok(());
        }

        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                }
                SchemaDrift::TypeMismatch { table, column, expected, actual } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. Manual migration required.",
                        table, column, expected, actual
                    );
                }
                SchemaDrift::ConstraintMismatch { table, column, constraint } => {
                    warn!(
                        "Constraint mismatch in {}.{}: missing '{}'. Manual migration required.",
                        table, column, constraint
                    );
                }
            }
        }

        Ok(())
    }

    /// `ALTER TABLE ADD COLUMN`; tolerates a concurrent add of the same column
    async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column.name, column.sql_type);

        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} via ALTER TABLE; adding it as a plain column",
                table, column.name
            );
        }

        // SQLite only accepts NOT NULL on an added column when a DEFAULT is given
        match (&column.default_value, column.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT; column will be nullable",
                table, column.name
            ),
            (None, false) => {}
        }

        info!("Adding column {}.{} ({})", table, column.name, column.sql_type);

        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                info!("Column {}.{} already present", table, column.name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    struct VisitsSchema;

    impl TableSchema for VisitsSchema {
        fn table_name() -> &'static str {
            "visits"
        }

        fn expected_columns() -> Vec<ColumnDefinition> {
            vec![
                ColumnDefinition::new("id", "INTEGER").autoincrement_key(),
                ColumnDefinition::new("who", "TEXT"),
                ColumnDefinition::new("flagged", "BOOLEAN").default("0"),
                ColumnDefinition::new("remark", "TEXT").not_null().default("''"),
            ]
        }
    }

    #[test]
    fn test_create_table_sql() {
        let sql = VisitsSchema::create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS visits"));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("flagged BOOLEAN DEFAULT 0"));
        assert!(sql.contains("remark TEXT NOT NULL DEFAULT ''"));
    }

    #[test]
    fn test_types_compatible() {
        assert!(SchemaDiff::types_compatible("TEXT", "text"));
        assert!(SchemaDiff::types_compatible("INTEGER", "BIGINT"));
        assert!(SchemaDiff::types_compatible("TEXT", "VARCHAR(20)"));
        assert!(SchemaDiff::types_compatible("BOOLEAN", "NUMERIC"));
        assert!(!SchemaDiff::types_compatible("TEXT", "INTEGER"));
        assert!(!SchemaDiff::types_compatible("REAL", "TEXT"));
    }

    #[tokio::test]
    async fn test_sync_creates_missing_table() {
        let pool = setup_test_db().await;

        SchemaSync::sync_table::<VisitsSchema>(&pool).await.unwrap();

        assert!(SchemaIntrospector::table_exists(&pool, "visits").await.unwrap());
        let columns = SchemaIntrospector::introspect_table(&pool, "visits").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "who", "flagged", "remark"]);
    }

    #[tokio::test]
    async fn test_detect_missing_column() {
        let pool = setup_test_db().await;
        sqlx::query("CREATE TABLE visits (id INTEGER PRIMARY KEY AUTOINCREMENT, who TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let actual = SchemaIntrospector::introspect_table(&pool, "visits").await.unwrap();
        let drift = SchemaDiff::compare("visits", &VisitsSchema::expected_columns(), &actual);

        let missing: Vec<&str> = drift
            .iter()
            .filter_map(|d| match d {
                SchemaDrift::MissingColumn { column, .. } => Some(column.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["flagged", "remark"]);
    }

    #[tokio::test]
    async fn test_detect_type_mismatch() {
        let pool = setup_test_db().await;
        sqlx::query(
            "CREATE TABLE visits (id INTEGER PRIMARY KEY AUTOINCREMENT, who INTEGER, \
             flagged BOOLEAN, remark TEXT NOT NULL DEFAULT '')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let actual = SchemaIntrospector::introspect_table(&pool, "visits").await.unwrap();
        let drift = SchemaDiff::compare("visits", &VisitsSchema::expected_columns(), &actual);

        assert_eq!(drift.len(), 1);
        assert!(matches!(
            &drift[0],
            SchemaDrift::TypeMismatch { column, .. } if column == "who"
        ));
    }

    #[tokio::test]
    async fn test_sync_adds_columns_without_backfill() {
        let pool = setup_test_db().await;
        sqlx::query("CREATE TABLE visits (id INTEGER PRIMARY KEY AUTOINCREMENT, who TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO visits (who) VALUES ('old row')")
            .execute(&pool)
            .await
            .unwrap();

        SchemaSync::sync_table::<VisitsSchema>(&pool).await.unwrap();

        let row = sqlx::query("SELECT who, flagged, remark FROM visits WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("who"), "old row");
        assert!(!row.get::<bool, _>("flagged"));
        assert_eq!(row.get::<String, _>("remark"), "");
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let pool = setup_test_db().await;

        SchemaSync::sync_table::<VisitsSchema>(&pool).await.unwrap();
        SchemaSync::sync_table::<VisitsSchema>(&pool).await.unwrap();

        let columns = SchemaIntrospector::introspect_table(&pool, "visits").await.unwrap();
        assert_eq!(columns.len(), 4);
    }
}
