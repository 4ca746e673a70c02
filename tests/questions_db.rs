use anyhow::Result;
use questions_db::{
    questions_schema, Database, OrmError, Question, QuestionFollower, QuestionLike, Reply, SqliteConfig,
    Table, User, Value,
};
use tempfile::TempDir;

// Helper function to create an in-memory database for testing
fn create_test_db() -> Result<Database> {
    Ok(Database::open_in_memory(questions_schema())?)
}

// Helper function to create a temporary file-based database
fn create_temp_db() -> Result<(Database, TempDir)> {
    let dir = TempDir::new()?;
    let config = SqliteConfig::new(dir.path().join("nested").join("questions.db"), questions_schema());
    let db = Database::open(&config)?;
    Ok((db, dir))
}

fn user(db: &Database, fname: &str, lname: &str) -> Result<User> {
    let mut user = User::new(fname, lname);
    user.insert(db)?;
    Ok(user)
}

fn question(db: &Database, title: &str, author: &User) -> Result<Question> {
    let mut question = Question::new(title, "body", author.persisted_id()?);
    question.insert(db)?;
    Ok(question)
}

fn like(db: &Database, question: &Question, liker: &User) -> Result<()> {
    QuestionLike::new(question.persisted_id()?, liker.persisted_id()?).insert(db)?;
    Ok(())
}

fn follow(db: &Database, question: &Question, follower: &User) -> Result<()> {
    QuestionFollower::new(question.persisted_id()?, follower.persisted_id()?).insert(db)?;
    Ok(())
}

#[test]
fn single_like_scenario() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    assert_eq!(ada.id, Some(1));
    let q = question(&db, "T", &ada)?;
    assert_eq!(q.id, Some(1));
    like(&db, &q, &ada)?;

    let stored = Question::find_by_id(&db, 1)?.expect("question 1");
    assert_eq!(stored.num_likes(&db)?, 1);

    let top = Question::most_liked(&db, 1)?;
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, Some(1));
    Ok(())
}

#[test]
fn find_returns_matching_rows_in_storage_order() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let first = question(&db, "first", &ada)?;
    question(&db, "other", &grace)?;
    let second = question(&db, "second", &ada)?;

    let found = Question::find(&db, "author_id", ada.persisted_id()?)?;
    assert_eq!(found, vec![first, second]);
    assert!(Question::find(&db, "author_id", 99)?.is_empty());
    Ok(())
}

#[test]
fn insert_then_find_by_id_round_trips() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let q = question(&db, "T", &ada)?;
    let mut reply = Reply::new("an answer", ada.persisted_id()?, q.persisted_id()?);
    let id = reply.insert(&db)?;

    assert_eq!(Reply::find_by_id(&db, id)?, Some(reply));
    assert_eq!(Reply::find_by_id(&db, id + 1)?, None);
    Ok(())
}

#[test]
fn save_updates_or_inserts() -> Result<()> {
    let db = create_test_db()?;
    let mut ada = user(&db, "Ada", "Lovelace")?;
    let mut grace = user(&db, "Grace", "Hopper")?;
    assert_eq!(User::count(&db)?, 2);

    ada.lname = "King".to_string();
    ada.save(&db)?;
    assert_eq!(User::count(&db)?, 2);
    assert_eq!(User::find_by_id(&db, ada.persisted_id()?)?, Some(ada.clone()));
    assert_eq!(User::find_by_id(&db, grace.persisted_id()?)?, Some(grace.clone()));

    let mut alan = User::new("Alan", "Turing");
    let id = alan.save(&db)?;
    assert_eq!(User::count(&db)?, 3);
    assert_eq!(alan.id, Some(id));

    grace.fname = "Amazing Grace".to_string();
    assert_eq!(grace.save(&db)?, grace.persisted_id()?);
    Ok(())
}

#[test]
fn follow_associations_are_symmetric() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let q = question(&db, "T", &ada)?;
    follow(&db, &q, &grace)?;

    assert_eq!(grace.followed_questions(&db)?, vec![q.clone()]);
    assert_eq!(q.followers(&db)?, vec![grace.clone()]);
    assert!(ada.followed_questions(&db)?.is_empty());
    Ok(())
}

#[test]
fn like_associations_are_symmetric() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let q = question(&db, "T", &ada)?;
    like(&db, &q, &grace)?;
    like(&db, &q, &ada)?;

    assert_eq!(grace.liked_questions(&db)?, vec![q.clone()]);
    let likers = q.likers(&db)?;
    assert_eq!(likers.len(), 2);
    assert!(likers.contains(&ada) && likers.contains(&grace));
    assert_eq!(q.num_likes(&db)?, 2);
    Ok(())
}

#[test]
fn most_followed_is_bounded_and_ordered() -> Result<()> {
    let db = create_test_db()?;
    let users: Vec<User> = (0..3)
        .map(|i| user(&db, &format!("user{i}"), "x"))
        .collect::<Result<_>>()?;
    let quiet = question(&db, "quiet", &users[0])?;
    let busy = question(&db, "busy", &users[0])?;
    let middling = question(&db, "middling", &users[0])?;
    question(&db, "ignored", &users[0])?;

    follow(&db, &quiet, &users[0])?;
    for u in &users {
        follow(&db, &busy, u)?;
    }
    follow(&db, &middling, &users[1])?;
    follow(&db, &middling, &users[2])?;

    let top = Question::most_followed(&db, 2)?;
    assert_eq!(top, vec![busy.clone(), middling.clone()]);

    let all = Question::most_followed(&db, 10)?;
    assert_eq!(all.len(), 3);
    assert_eq!(all[2], quiet);
    assert!(Question::most_followed(&db, 0)?.is_empty());
    Ok(())
}

#[test]
fn most_liked_is_ordered_by_like_count() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let one = question(&db, "one", &ada)?;
    let two = question(&db, "two", &ada)?;
    like(&db, &one, &ada)?;
    like(&db, &two, &ada)?;
    like(&db, &two, &grace)?;

    let ranked = Question::most_liked(&db, 5)?;
    assert_eq!(ranked, vec![two, one]);
    Ok(())
}

#[test]
fn average_karma_is_likes_per_authored_question() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let liked = question(&db, "liked", &grace)?;
    question(&db, "unliked", &grace)?;
    like(&db, &liked, &ada)?;
    like(&db, &liked, &grace)?;
    like(&db, &liked, &ada)?;

    assert!((grace.average_karma(&db)? - 1.5).abs() < f64::EPSILON);
    assert_eq!(ada.average_karma(&db)?, 0.0);
    Ok(())
}

#[test]
fn authored_lookups() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let q = question(&db, "T", &ada)?;
    let mut reply = Reply::new("self answer", ada.persisted_id()?, q.persisted_id()?);
    reply.insert(&db)?;

    assert_eq!(ada.authored_questions(&db)?, vec![q.clone()]);
    assert_eq!(ada.authored_replies(&db)?, vec![reply.clone()]);
    assert_eq!(q.replies(&db)?, vec![reply]);
    assert_eq!(q.author(&db)?, Some(ada));
    Ok(())
}

#[test]
fn undeclared_field_fails_loudly() -> Result<()> {
    let db = create_test_db()?;
    user(&db, "Ada", "Lovelace")?;
    let row = db.find_by_id("users", 1)?.expect("user row");
    assert_eq!(row.get("fname")?, &Value::Text("Ada".into()));
    assert!(matches!(row.get("nonexistent_field"), Err(OrmError::NoSuchField(_))));
    Ok(())
}

#[test]
fn untrusted_identifiers_are_rejected() -> Result<()> {
    let db = create_test_db()?;
    let err = User::find(&db, "fname = fname OR 1", "x").unwrap_err();
    assert!(matches!(err, OrmError::UnknownColumn { .. }));
    assert!(matches!(db.find_by_id("sqlite_master", 1), Err(OrmError::UnknownTable(_))));
    Ok(())
}

#[test]
fn dangling_foreign_key_is_a_storage_error() -> Result<()> {
    let db = create_test_db()?;
    let err = QuestionLike::new(1, 1).insert(&db).unwrap_err();
    assert!(matches!(err, OrmError::Sqlite(_)));
    assert_eq!(QuestionLike::count(&db)?, 0);
    Ok(())
}

#[test]
fn non_utf8_text_is_not_rewritten() -> Result<()> {
    let db = create_test_db()?;
    db.execute(
        "INSERT INTO users (fname, lname) VALUES (CAST(X'FF41' AS TEXT), 'x')",
        &[],
    )?;
    assert!(matches!(User::find_by_id(&db, 1), Err(OrmError::Sqlite(_))));
    Ok(())
}

#[test]
fn foreign_keys_can_be_switched_off() -> Result<()> {
    let dir = TempDir::new()?;
    let config =
        SqliteConfig::new(dir.path().join("questions.db"), questions_schema()).with_foreign_keys(false);
    let db = Database::open(&config)?;
    let mut dangling = QuestionLike::new(9, 9);
    dangling.insert(&db)?;
    assert_eq!(QuestionLike::count(&db)?, 1);
    assert_eq!(QuestionLike::num_likes_for_question_id(&db, 9)?, 0);
    Ok(())
}

#[test]
fn duplicate_follows_are_counted_each_time() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let grace = user(&db, "Grace", "Hopper")?;
    let twice = question(&db, "twice", &ada)?;
    let once = question(&db, "once", &ada)?;
    follow(&db, &twice, &grace)?;
    follow(&db, &twice, &grace)?;
    follow(&db, &once, &ada)?;

    assert_eq!(twice.followers(&db)?, vec![grace.clone(), grace]);
    assert_eq!(Question::most_followed(&db, 1)?, vec![twice]);
    Ok(())
}

#[test]
fn file_database_persists_across_opens() -> Result<()> {
    let (db, dir) = create_temp_db()?;
    assert!(db.path().exists());
    user(&db, "Ada", "Lovelace")?;
    let path = db.path().to_path_buf();
    drop(db);

    let reopened = Database::open(&SqliteConfig::new(path, questions_schema()))?;
    let ada = User::find_by_name(&reopened, "Ada", "Lovelace")?.expect("persisted user");
    assert_eq!(ada.id, Some(1));
    drop(dir);
    Ok(())
}

#[test]
fn records_serialize_by_column_name() -> Result<()> {
    let db = create_test_db()?;
    let ada = user(&db, "Ada", "Lovelace")?;
    let json = serde_json::to_value(&ada)?;
    assert_eq!(json, serde_json::json!({ "id": 1, "fname": "Ada", "lname": "Lovelace" }));
    Ok(())
}

#[test]
fn values_round_trip_through_json() -> Result<()> {
    let values = vec![
        Value::Null,
        Value::Integer(7),
        Value::Real(1.5),
        Value::Text("Ada".into()),
        Value::Blob(vec![0xff, 0x41]),
        Value::Boolean(true),
    ];
    let json = serde_json::to_string(&values)?;
    assert_eq!(json, r#"[null,7,1.5,"Ada",[255,65],true]"#);
    let back: Vec<Value> = serde_json::from_str(&json)?;
    assert_eq!(back, values);
    Ok(())
}
