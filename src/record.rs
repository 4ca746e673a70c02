use std::collections::HashMap;

use tracing::instrument;

use crate::error::{OrmError, Result};
use crate::sqlite::{Database, Value};

/// One row as a column-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Reads a field, failing for names the row does not carry.
    pub fn get(&self, field: &str) -> Result<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| OrmError::NoSuchField(field.to_string()))
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> HashMap<String, Value> {
        self.fields
    }

    pub fn integer(&self, field: &str) -> Result<i64> {
        let value = self.get(field)?;
        value.as_i64().ok_or_else(|| mismatch(field, "integer", value))
    }

    pub fn optional_integer(&self, field: &str) -> Result<Option<i64>> {
        match self.get(field)? {
            Value::Null => Ok(None),
            value => value.as_i64().map(Some).ok_or_else(|| mismatch(field, "integer", value)),
        }
    }

    pub fn real(&self, field: &str) -> Result<f64> {
        let value = self.get(field)?;
        value.as_f64().ok_or_else(|| mismatch(field, "real", value))
    }

    pub fn text(&self, field: &str) -> Result<String> {
        let value = self.get(field)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(field, "text", value))
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self::new(fields)
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> OrmError {
    OrmError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Base behaviour shared by every entity backed by one table.
///
/// Implementors describe their table and how to move between a [`Record`] and
/// the typed struct; finders and persistence come for free.
pub trait Table: Sized {
    const TABLE: &'static str;
    /// Non-id columns, in the order [`Table::values`] returns them.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
    fn from_record(record: Record) -> Result<Self>;
    fn values(&self) -> Vec<Value>;

    fn persisted_id(&self) -> Result<i64> {
        self.id().ok_or(OrmError::MissingId(Self::TABLE))
    }

    fn find(db: &Database, field: &str, value: impl Into<Value>) -> Result<Vec<Self>> {
        db.find(Self::TABLE, field, value)?
            .into_iter()
            .map(Self::from_record)
            .collect()
    }

    fn find_by_id(db: &Database, id: i64) -> Result<Option<Self>> {
        db.find_by_id(Self::TABLE, id)?.map(Self::from_record).transpose()
    }

    /// Free-form query whose rows hydrate into this type.
    fn query(db: &Database, sql: &str, params: &[Value]) -> Result<Vec<Self>> {
        db.query(sql, params)?
            .into_iter()
            .map(Self::from_record)
            .collect()
    }

    fn count(db: &Database) -> Result<i64> {
        db.count(Self::TABLE)
    }

    /// Inserts a new row and stores the generated id on `self`.
    #[instrument(skip_all, fields(table = Self::TABLE))]
    fn insert(&mut self, db: &Database) -> Result<i64> {
        if let Some(id) = self.id() {
            return Err(OrmError::AlreadyPersisted { table: Self::TABLE, id });
        }
        let placeholders = vec!["?"; Self::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::TABLE,
            Self::COLUMNS.join(", "),
            placeholders
        );
        db.execute(&sql, &self.values())?;
        let id = db.last_insert_rowid();
        self.set_id(id);
        Ok(id)
    }

    /// Writes every non-id column back to the row with this record's id.
    #[instrument(skip_all, fields(table = Self::TABLE))]
    fn update(&self, db: &Database) -> Result<()> {
        let id = self.persisted_id()?;
        let assignments: Vec<String> = Self::COLUMNS.iter().map(|c| format!("{c} = ?")).collect();
        let sql = format!("UPDATE {} SET {} WHERE id = ?", Self::TABLE, assignments.join(", "));
        let mut params = self.values();
        params.push(Value::Integer(id));
        if db.execute(&sql, &params)? == 0 {
            return Err(OrmError::NotFound { table: Self::TABLE, id });
        }
        Ok(())
    }

    /// Updates when the record has an id, inserts otherwise.
    fn save(&mut self, db: &Database) -> Result<i64> {
        match self.id() {
            Some(id) => self.update(db).map(|()| id),
            None => self.insert(db),
        }
    }
}
