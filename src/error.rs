/// Errors raised by the record layer.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    #[error("{0} is not a valid field")]
    NoSuchField(String),

    #[error("field {field} holds {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("{0} record has no id")]
    MissingId(&'static str),

    #[error("{table} record already has id {id}")]
    AlreadyPersisted { table: &'static str, id: i64 },

    #[error("no {table} row with id {id}")]
    NotFound { table: &'static str, id: i64 },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrmError>;
