use serde::{Deserialize, Serialize};

use super::{Question, User};
use crate::error::Result;
use crate::record::{Record, Table};
use crate::schema::REPLIES;
use crate::sqlite::{Database, Value};

/// A reply to a question, optionally nested under another reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Option<i64>,
    pub body: String,
    pub author_id: i64,
    pub question_id: i64,
    pub parent_reply_id: Option<i64>,
}

impl Reply {
    pub fn new(body: impl Into<String>, author_id: i64, question_id: i64) -> Self {
        Self {
            id: None,
            body: body.into(),
            author_id,
            question_id,
            parent_reply_id: None,
        }
    }

    pub fn with_parent(mut self, parent_reply_id: i64) -> Self {
        self.parent_reply_id = Some(parent_reply_id);
        self
    }

    pub fn find_by_author_id(db: &Database, author_id: i64) -> Result<Vec<Reply>> {
        Self::find(db, "author_id", author_id)
    }

    pub fn find_by_question_id(db: &Database, question_id: i64) -> Result<Vec<Reply>> {
        Self::find(db, "question_id", question_id)
    }

    pub fn author(&self, db: &Database) -> Result<Option<User>> {
        User::find_by_id(db, self.author_id)
    }

    pub fn question(&self, db: &Database) -> Result<Option<Question>> {
        Question::find_by_id(db, self.question_id)
    }

    /// `None` for a top-level reply.
    pub fn parent_reply(&self, db: &Database) -> Result<Option<Reply>> {
        match self.parent_reply_id {
            Some(parent_id) => Reply::find_by_id(db, parent_id),
            None => Ok(None),
        }
    }

    pub fn child_replies(&self, db: &Database) -> Result<Vec<Reply>> {
        Self::query(
            db,
            "SELECT child.*
               FROM replies child
               JOIN replies parent
                 ON child.parent_reply_id = parent.id
              WHERE parent.id = ?",
            &[self.persisted_id()?.into()],
        )
    }
}

impl Table for Reply {
    const TABLE: &'static str = REPLIES;
    const COLUMNS: &'static [&'static str] = &["body", "author_id", "question_id", "parent_reply_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_record(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.optional_integer("id")?,
            body: record.text("body")?,
            author_id: record.integer("author_id")?,
            question_id: record.integer("question_id")?,
            parent_reply_id: record.optional_integer("parent_reply_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.body.as_str().into(),
            self.author_id.into(),
            self.question_id.into(),
            self.parent_reply_id.into(),
        ]
    }
}
