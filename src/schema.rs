use std::fmt;

use crate::error::{OrmError, Result};

pub const USERS: &str = "users";
pub const QUESTIONS: &str = "questions";
pub const REPLIES: &str = "replies";
pub const QUESTION_FOLLOWERS: &str = "question_followers";
pub const QUESTION_LIKES: &str = "question_likes";

/// Schema definition for the SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Checks an identifier pair before it is interpolated into SQL.
    pub fn check_column(&self, table: &str, column: &str) -> Result<()> {
        let definition = self
            .table(table)
            .ok_or_else(|| OrmError::UnknownTable(table.to_string()))?;
        if definition.column(column).is_none() {
            return Err(OrmError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds the `id INTEGER PRIMARY KEY` identity column.
    pub fn with_id(self) -> Self {
        self.with_column(ColumnDefinition::new("id", DataType::Integer).constraint(ColumnConstraint::PrimaryKey))
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(mut self, column: &str, foreign_table: &str, foreign_column: &str) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::to_sql).collect();
        parts.extend(self.foreign_keys.iter().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.foreign_table, fk.foreign_column
            )
        }));
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.name, parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type);
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(match constraint {
                ColumnConstraint::PrimaryKey => "PRIMARY KEY AUTOINCREMENT",
                ColumnConstraint::NotNull => "NOT NULL",
                ColumnConstraint::Unique => "UNIQUE",
            });
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Text => write!(f, "TEXT"),
            Self::Real => write!(f, "REAL"),
            Self::Blob => write!(f, "BLOB"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Unique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

fn required(name: &str, data_type: DataType) -> ColumnDefinition {
    ColumnDefinition::new(name, data_type).constraint(ColumnConstraint::NotNull)
}

/// The five tables backing the questions application.
pub fn questions_schema() -> Schema {
    Schema::new()
        .add_table(
            TableDefinition::new(USERS)
                .with_id()
                .with_column(required("fname", DataType::Text))
                .with_column(required("lname", DataType::Text)),
        )
        .add_table(
            TableDefinition::new(QUESTIONS)
                .with_id()
                .with_column(required("title", DataType::Text))
                .with_column(required("body", DataType::Text))
                .with_column(required("author_id", DataType::Integer))
                .with_foreign_key("author_id", USERS, "id"),
        )
        .add_table(
            TableDefinition::new(REPLIES)
                .with_id()
                .with_column(required("body", DataType::Text))
                .with_column(required("author_id", DataType::Integer))
                .with_column(required("question_id", DataType::Integer))
                .with_column(ColumnDefinition::new("parent_reply_id", DataType::Integer))
                .with_foreign_key("author_id", USERS, "id")
                .with_foreign_key("question_id", QUESTIONS, "id")
                .with_foreign_key("parent_reply_id", REPLIES, "id"),
        )
        .add_table(
            TableDefinition::new(QUESTION_FOLLOWERS)
                .with_id()
                .with_column(required("question_id", DataType::Integer))
                .with_column(required("follower_id", DataType::Integer))
                .with_foreign_key("question_id", QUESTIONS, "id")
                .with_foreign_key("follower_id", USERS, "id"),
        )
        .add_table(
            TableDefinition::new(QUESTION_LIKES)
                .with_id()
                .with_column(required("question_id", DataType::Integer))
                .with_column(required("liker_id", DataType::Integer))
                .with_foreign_key("question_id", QUESTIONS, "id")
                .with_foreign_key("liker_id", USERS, "id"),
        )
}
