use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Offset added to the schema version stored in `PRAGMA user_version`, so a
/// database created by this server is never confused with an arbitrary file.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    Restrict,
    SetNull,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                create_sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.as_sql()
                ));
            }
        }

        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])
            .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

/// SQLite reports some defaults wrapped in parentheses.
fn normalized_default(value: Option<&str>) -> Option<&str> {
    value.map(|v| {
        v.strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(v)
    })
}

/// A column as reported by `PRAGMA table_info`.
struct ColumnInfo {
    name: String,
    sql_type: String,
    non_null: bool,
    default_value: Option<String>,
    is_primary_key: bool,
}

impl ColumnInfo {
    /// Describe the first difference from `expected`, if any.
    fn mismatch(&self, expected: &Column) -> Option<String> {
        if self.name != expected.name {
            return Some(format!("expected column {}, found {}", expected.name, self.name));
        }
        if self.sql_type != expected.sql_type.as_sql() {
            return Some(format!(
                "column {} type mismatch: expected {}, got {}",
                self.name,
                expected.sql_type.as_sql(),
                self.sql_type
            ));
        }
        if self.non_null != expected.non_null {
            return Some(format!(
                "column {} non-null mismatch: expected {}, got {}",
                self.name, expected.non_null, self.non_null
            ));
        }
        if normalized_default(self.default_value.as_deref())
            != normalized_default(expected.default_value)
        {
            return Some(format!(
                "column {} default value mismatch: expected {:?}, got {:?}",
                self.name, expected.default_value, self.default_value
            ));
        }
        if self.is_primary_key != expected.is_primary_key {
            return Some(format!(
                "column {} primary key mismatch: expected {}, got {}",
                self.name, expected.is_primary_key, self.is_primary_key
            ));
        }
        None
    }
}

fn read_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                sql_type: row.get(2)?,
                non_null: row.get::<_, i32>(3)? == 1,
                default_value: row.get(4)?,
                is_primary_key: row.get::<_, i32>(5)? == 1,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read columns of table {}", table))?;
    Ok(columns)
}

fn index_exists(conn: &Connection, table: &str, index: &str) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1 AND tbl_name = ?2",
            params![index, table],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Check that every table has exactly the declared columns, in order, and
    /// all declared indices.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            let actual = read_columns(conn, table.name)?;
            if actual.len() != table.columns.len() {
                let found: Vec<&str> = actual.iter().map(|c| c.name.as_str()).collect();
                let expected: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
                bail!(
                    "Table {} has columns [{}], expected [{}]",
                    table.name,
                    found.join(", "),
                    expected.join(", ")
                );
            }

            if let Some(problem) = actual
                .iter()
                .zip(table.columns.iter())
                .find_map(|(column, expected)| column.mismatch(expected))
            {
                bail!("Table {}: {}", table.name, problem);
            }

            for (index_name, _) in table.indices {
                if !index_exists(conn, table.name, index_name)? {
                    bail!("Table {} is missing index '{}'", table.name, index_name);
                }
            }
        }
        Ok(())
    }
}
