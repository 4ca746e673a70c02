//! Typed entities of the questions application.

mod question;
mod question_follower;
mod question_like;
mod reply;
mod user;

pub use question::Question;
pub use question_follower::QuestionFollower;
pub use question_like::QuestionLike;
pub use reply::Reply;
pub use user::User;

use crate::sqlite::Value;

/// Binds a row limit, saturating values SQLite cannot hold.
fn limit(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}
