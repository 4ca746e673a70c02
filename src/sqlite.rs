use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OrmError, Result};
use crate::record::Record;
use crate::schema::{questions_schema, Schema};

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Boolean(_) => "boolean",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// TEXT that is not valid UTF-8 is a conversion error, never rewritten.
impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(_) => Value::Text(value.as_str()?.to_string()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r) => ToSqlOutput::from(*r),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
            Value::Boolean(b) => ToSqlOutput::from(*b),
        })
    }
}

/// SQLite configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Schema created on open
    pub schema: Schema,
    /// Whether `PRAGMA foreign_keys` is switched on
    pub foreign_keys: bool,
}

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
            foreign_keys: true,
        }
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new("questions.db", questions_schema())
    }
}

/// A single SQLite connection plus the schema used to validate identifiers.
///
/// Every record operation takes `&Database`. The handle is not `Sync`; callers
/// sharing it across threads have to serialize access themselves.
pub struct Database {
    conn: Connection,
    schema: Schema,
    path: PathBuf,
}

impl Database {
    /// Open or create the database file and bootstrap its schema.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&config.db_path)?;
        let db = Self {
            conn,
            schema: config.schema.clone(),
            path: config.db_path.clone(),
        };
        db.configure(config.foreign_keys)?;
        info!(path = %config.db_path.display(), "database opened");
        Ok(db)
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory(schema: Schema) -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
            schema,
            path: PathBuf::from(":memory:"),
        };
        db.configure(true)?;
        info!("in-memory database opened");
        Ok(db)
    }

    fn configure(&self, foreign_keys: bool) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", foreign_keys)?;
        self.initialize_schema()
    }

    /// Creates every table of the schema that does not exist yet.
    pub fn initialize_schema(&self) -> Result<()> {
        for table in &self.schema.tables {
            let sql = table.create_sql();
            debug!(table = %table.name, "creating table");
            self.conn.execute_batch(&sql)?;
        }
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Execute a statement (INSERT, UPDATE, DELETE) and return the affected row count.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, "execute");
        let count = self.conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(count)
    }

    /// Run a query and map every row to a record keyed by column name.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut fields = HashMap::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                fields.insert(name.clone(), row.get::<_, Value>(idx)?);
            }
            Ok(Record::new(fields))
        })?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn first_row(&self, sql: &str, params: &[Value]) -> Result<Option<Record>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// `SELECT * FROM <table> WHERE <field> = ?` with both identifiers checked
    /// against the schema.
    pub fn find(&self, table: &str, field: &str, value: impl Into<Value>) -> Result<Vec<Record>> {
        self.schema.check_column(table, field)?;
        let sql = format!("SELECT * FROM {table} WHERE {field} = ?");
        self.query(&sql, &[value.into()])
    }

    pub fn find_by_id(&self, table: &str, id: i64) -> Result<Option<Record>> {
        self.schema.check_column(table, "id")?;
        let sql = format!("SELECT * FROM {table} WHERE id = ?");
        self.first_row(&sql, &[Value::Integer(id)])
    }

    pub fn count(&self, table: &str) -> Result<i64> {
        if self.schema.table(table).is_none() {
            return Err(OrmError::UnknownTable(table.to_string()));
        }
        let row = self.first_row(&format!("SELECT COUNT(*) AS total FROM {table}"), &[])?;
        match row {
            Some(record) => record.integer("total"),
            None => Ok(0),
        }
    }
}
