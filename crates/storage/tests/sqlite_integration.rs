use chrono::Duration;
use edu_core::model::{Course, CourseId, LearnerId, Module, Question, Quiz, Score};
use edu_core::time::fixed_now;
use storage::repository::{
    CompletionWrite, CourseRepository, IdentityRecord, ProfileRepository, StorageError,
};
use storage::sqlite::SqliteRepository;
use url::Url;

fn course_id(label: u8) -> CourseId {
    format!("{label:024x}").parse().unwrap()
}

fn build_course(label: u8) -> Course {
    let questions = vec![
        Question::new("1 + 1?", vec!["1".into(), "2".into(), "3".into()], 1).unwrap(),
        Question::new("2 + 2?", vec!["3".into(), "4".into()], 1).unwrap(),
    ];
    let video = Url::parse("https://www.youtube.com/watch?v=abc123").unwrap();
    let quizzed = Module::new(
        "Arithmetic",
        "first paragraph\nsecond paragraph",
        Some(video),
        Some(Quiz::new(questions, None)),
    )
    .unwrap();
    let plain = Module::new("Reading", "just text", None, None).unwrap();

    Course::new(
        course_id(label),
        format!("Course {label}"),
        "a course about numbers",
        "Math",
        "Prof. Adams",
        vec![quizzed, plain],
        fixed_now(),
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_course_with_content() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_course_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let course = build_course(1);
    repo.insert_course(&course).await.unwrap();

    let fetched = repo.get_course(course.id()).await.expect("fetch").unwrap();
    assert_eq!(fetched, course);

    let quiz = fetched.module(0).unwrap().quiz().unwrap();
    assert_eq!(quiz.questions().len(), 2);
    assert_eq!(quiz.questions()[0].options(), &["1", "2", "3"]);
    assert_eq!(quiz.questions()[0].correct_answer(), 1);
    assert!(fetched.module(1).unwrap().quiz().is_none());
}

#[tokio::test]
async fn sqlite_update_replaces_content_and_delete_cascades() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_course_update?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let course = build_course(2);
    repo.insert_course(&course).await.unwrap();

    let replacement_module = Module::new("Rewritten", "new text", None, None).unwrap();
    let updated = Course::new(
        course.id().clone(),
        "Renamed Course",
        "new description",
        course.subject(),
        course.professor(),
        vec![replacement_module],
        course.created_at(),
        fixed_now() + Duration::hours(1),
    )
    .unwrap();
    repo.update_course(&updated).await.unwrap();

    let fetched = repo.get_course(course.id()).await.unwrap().unwrap();
    assert_eq!(fetched.title(), "Renamed Course");
    assert_eq!(fetched.modules().len(), 1);
    assert!(fetched.module(0).unwrap().quiz().is_none());
    assert_eq!(fetched.created_at(), course.created_at());

    repo.delete_course(course.id()).await.unwrap();
    assert!(repo.get_course(course.id()).await.unwrap().is_none());

    let err = repo.delete_course(course.id()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_insert_duplicate_course_conflicts() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_course_conflict?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let course = build_course(3);
    repo.insert_course(&course).await.unwrap();
    let err = repo.insert_course(&course).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_completion_upsert_keeps_set_semantics() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_completions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let learner = LearnerId::new("user_2abc").unwrap();
    let now = fixed_now();

    let first = repo
        .record_completion(&learner, &course_id(1), Score::new(90).unwrap(), now)
        .await
        .unwrap();
    assert_eq!(
        first,
        CompletionWrite {
            updated: false,
            upserted: true
        }
    );

    let second = repo
        .record_completion(
            &learner,
            &course_id(1),
            Score::new(70).unwrap(),
            now + Duration::days(1),
        )
        .await
        .unwrap();
    assert_eq!(
        second,
        CompletionWrite {
            updated: true,
            upserted: false
        }
    );

    let profile = repo.get_profile(&learner).await.unwrap().unwrap();
    assert_eq!(profile.enrolled_courses(), &[course_id(1)]);
    assert_eq!(profile.completed_courses().len(), 2);
    // Most recent first.
    assert_eq!(profile.completed_courses()[0].score.value(), 70);
    assert_eq!(profile.completed_courses()[1].score.value(), 90);
}

#[tokio::test]
async fn sqlite_identity_upsert_is_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let learner = LearnerId::new("user_2abc").unwrap();
    let identity = IdentityRecord {
        learner_id: learner.clone(),
        full_name: Some("Rabin Bhandari".into()),
        email: Some("rabin@example.com".into()),
        image_url: Some("https://img.example.com/rabin.png".into()),
    };

    repo.upsert_identity(&identity).await.unwrap();
    repo.upsert_identity(&identity).await.unwrap();

    let profile = repo.get_profile(&learner).await.unwrap().unwrap();
    assert_eq!(profile.full_name(), Some("Rabin Bhandari"));
    assert_eq!(profile.email(), Some("rabin@example.com"));

    // A completion recorded before identity sync survives the sync.
    repo.record_completion(&learner, &course_id(9), Score::new(55).unwrap(), fixed_now())
        .await
        .unwrap();
    repo.upsert_identity(&identity).await.unwrap();
    let profile = repo.get_profile(&learner).await.unwrap().unwrap();
    assert_eq!(profile.completed_courses().len(), 1);
}

#[tokio::test]
async fn sqlite_missing_profile_reads_as_none() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing_profile?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let learner = LearnerId::new("ghost").unwrap();
    assert!(repo.get_profile(&learner).await.unwrap().is_none());
}
