use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Question, QuestionFollower, QuestionLike, Reply};
use crate::error::Result;
use crate::record::{Record, Table};
use crate::schema::USERS;
use crate::sqlite::{Database, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub fname: String,
    pub lname: String,
}

impl User {
    pub fn new(fname: impl Into<String>, lname: impl Into<String>) -> Self {
        Self {
            id: None,
            fname: fname.into(),
            lname: lname.into(),
        }
    }

    /// First user with this exact name, if any.
    pub fn find_by_name(db: &Database, fname: &str, lname: &str) -> Result<Option<User>> {
        let users = Self::query(
            db,
            "SELECT * FROM users WHERE fname = ? AND lname = ?",
            &[fname.into(), lname.into()],
        )?;
        Ok(users.into_iter().next())
    }

    pub fn authored_questions(&self, db: &Database) -> Result<Vec<Question>> {
        Question::find_by_author_id(db, self.persisted_id()?)
    }

    pub fn authored_replies(&self, db: &Database) -> Result<Vec<Reply>> {
        Reply::find_by_author_id(db, self.persisted_id()?)
    }

    pub fn followed_questions(&self, db: &Database) -> Result<Vec<Question>> {
        QuestionFollower::followed_questions_for_user_id(db, self.persisted_id()?)
    }

    pub fn liked_questions(&self, db: &Database) -> Result<Vec<Question>> {
        QuestionLike::liked_questions_for_user_id(db, self.persisted_id()?)
    }

    /// Likes received across this user's questions divided by the number of
    /// questions they authored. 0.0 when they authored none.
    #[instrument(skip_all, fields(user_id = ?self.id))]
    pub fn average_karma(&self, db: &Database) -> Result<f64> {
        let row = db.first_row(
            "SELECT COALESCE(
                    CAST(COUNT(question_likes.id) AS REAL) / COUNT(DISTINCT questions.id),
                    0.0) AS karma
               FROM questions
               LEFT OUTER JOIN question_likes
                 ON questions.id = question_likes.question_id
              WHERE questions.author_id = ?",
            &[self.persisted_id()?.into()],
        )?;
        match row {
            Some(record) => record.real("karma"),
            None => Ok(0.0),
        }
    }
}

impl Table for User {
    const TABLE: &'static str = USERS;
    const COLUMNS: &'static [&'static str] = &["fname", "lname"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_record(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.optional_integer("id")?,
            fname: record.text("fname")?,
            lname: record.text("lname")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.fname.as_str().into(), self.lname.as_str().into()]
    }
}
