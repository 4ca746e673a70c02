use serde::{Deserialize, Serialize};

use super::{limit, Question, User};
use crate::error::Result;
use crate::record::{Record, Table};
use crate::schema::QUESTION_LIKES;
use crate::sqlite::{Database, Value};

/// A user liking a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionLike {
    pub id: Option<i64>,
    pub question_id: i64,
    pub liker_id: i64,
}

impl QuestionLike {
    pub fn new(question_id: i64, liker_id: i64) -> Self {
        Self {
            id: None,
            question_id,
            liker_id,
        }
    }

    pub fn likers_for_question_id(db: &Database, question_id: i64) -> Result<Vec<User>> {
        User::query(
            db,
            "SELECT users.*
               FROM users
               JOIN question_likes
                 ON users.id = question_likes.liker_id
              WHERE question_likes.question_id = ?",
            &[question_id.into()],
        )
    }

    pub fn liked_questions_for_user_id(db: &Database, user_id: i64) -> Result<Vec<Question>> {
        Question::query(
            db,
            "SELECT questions.*
               FROM questions
               JOIN question_likes
                 ON questions.id = question_likes.question_id
              WHERE question_likes.liker_id = ?",
            &[user_id.into()],
        )
    }

    pub fn num_likes_for_question_id(db: &Database, question_id: i64) -> Result<i64> {
        let row = db.first_row(
            "SELECT COUNT(*) AS likes
               FROM users
               JOIN question_likes
                 ON users.id = question_likes.liker_id
              WHERE question_likes.question_id = ?",
            &[question_id.into()],
        )?;
        match row {
            Some(record) => record.integer("likes"),
            None => Ok(0),
        }
    }

    /// At most `n` questions, most likes first. Ties are unordered.
    pub fn most_liked_questions(db: &Database, n: usize) -> Result<Vec<Question>> {
        Question::query(
            db,
            "SELECT questions.*
               FROM questions
               JOIN question_likes
                 ON questions.id = question_likes.question_id
           GROUP BY question_likes.question_id
           ORDER BY COUNT(*) DESC
              LIMIT ?",
            &[limit(n)],
        )
    }
}

impl Table for QuestionLike {
    const TABLE: &'static str = QUESTION_LIKES;
    const COLUMNS: &'static [&'static str] = &["question_id", "liker_id"];

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
            liker_id: record.integer("liker_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.question_id.into(), self.liker_id.into()]
    }
}
