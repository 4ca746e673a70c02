use serde::{Deserialize, Serialize};

use super::{limit, Question, User};
use crate::error::Result;
use crate::record::{Record, Table};
use crate::schema::QUESTION_FOLLOWERS;
use crate::sqlite::{Database, Value};

/// A user following a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFollower {
    pub id: Option<i64>,
    pub question_id: i64,
    pub follower_id: i64,
}

impl QuestionFollower {
    pub fn new(question_id: i64, follower_id: i64) -> Self {
        Self {
            id: None,
            question_id,
            follower_id,
        }
    }

    pub fn followers_for_question_id(db: &Database, question_id: i64) -> Result<Vec<User>> {
        User::query(
            db,
            "SELECT users.*
               FROM users
               JOIN question_followers
                 ON users.id = question_followers.follower_id
              WHERE question_followers.question_id = ?",
            &[question_id.into()],
        )
    }

    pub fn followed_questions_for_user_id(db: &Database, user_id: i64) -> Result<Vec<Question>> {
        Question::query(
            db,
            "SELECT questions.*
               FROM questions
               JOIN question_followers
                 ON questions.id = question_followers.question_id
              WHERE question_followers.follower_id = ?",
            &[user_id.into()],
        )
    }

    /// At most `n` questions, most followers first. Ties come back in
    /// whatever order SQLite groups them.
    pub fn most_followed_questions(db: &Database, n: usize) -> Result<Vec<Question>> {
        Question::query(
            db,
            "SELECT questions.*
               FROM questions
               JOIN question_followers
                 ON questions.id = question_followers.question_id
           GROUP BY question_followers.question_id
           ORDER BY COUNT(*) DESC
              LIMIT ?",
            &[limit(n)],
        )
    }
}

impl Table for QuestionFollower {
    const TABLE: &'static str = QUESTION_FOLLOWERS;
    const COLUMNS: &'static [&'static str] = &["question_id", "follower_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_record(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.optional_integer("id")?,
            question_id: record.integer("question_id")?,
            follower_id: record.integer("follower_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.question_id.into(), self.follower_id.into()]
    }
}
