use serde::{Deserialize, Serialize};

use super::{QuestionFollower, QuestionLike, Reply, User};
use crate::error::Result;
use crate::record::{Record, Table};
use crate::schema::QUESTIONS;
use crate::sqlite::{Database, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub author_id: i64,
}

impl Question {
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
            author_id,
        }
    }

    pub fn find_by_author_id(db: &Database, author_id: i64) -> Result<Vec<Question>> {
        Self::find(db, "author_id", author_id)
    }

    pub fn author(&self, db: &Database) -> Result<Option<User>> {
        User::find_by_id(db, self.author_id)
    }

    pub fn replies(&self, db: &Database) -> Result<Vec<Reply>> {
        Reply::find_by_question_id(db, self.persisted_id()?)
    }

    pub fn followers(&self, db: &Database) -> Result<Vec<User>> {
        QuestionFollower::followers_for_question_id(db, self.persisted_id()?)
    }

    pub fn likers(&self, db: &Database) -> Result<Vec<User>> {
        QuestionLike::likers_for_question_id(db, self.persisted_id()?)
    }

    pub fn num_likes(&self, db: &Database) -> Result<i64> {
        QuestionLike::num_likes_for_question_id(db, self.persisted_id()?)
    }

    pub fn most_liked(db: &Database, n: usize) -> Result<Vec<Question>> {
        QuestionLike::most_liked_questions(db, n)
    }

    pub fn most_followed(db: &Database, n: usize) -> Result<Vec<Question>> {
        QuestionFollower::most_followed_questions(db, n)
    }
}

impl Table for Question {
    const TABLE: &'static str = QUESTIONS;
    const COLUMNS: &'static [&'static str] = &["title", "body", "author_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_record(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.optional_integer("id")?,
            title: record.text("title")?,
            body: record.text("body")?,
            author_id: record.integer("author_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.as_str().into(),
            self.body.as_str().into(),
            self.author_id.into(),
        ]
    }
}
