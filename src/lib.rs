//! SQLite record layer for the questions application.
//!
//! # Intention
//!
//! - Provide typed records for users, questions, replies, follows and likes.
//! - Keep every operation a single parametrized statement against one
//!   explicitly owned connection.
//!
//! # Architectural Boundaries
//!
//! - Only data access belongs here.
//! - No presentation, validation or migration logic.

pub mod error;
pub mod models;
pub mod record;
pub mod schema;
pub mod sqlite;

pub use error::{OrmError, Result};
pub use models::{Question, QuestionFollower, QuestionLike, Reply, User};
pub use record::{Record, Table};
pub use schema::{questions_schema, Schema, TableDefinition};
pub use sqlite::{Database, SqliteConfig, Value};
