use chrono::{TimeZone, Utc};
use jobscout_core::models::{JobFilter, RoleLabel, SkillCount};
use jobscout_core::traits::JobStore;
use jobscout_db::{Database, JobRepository};

use crate::integration::common::{posting, setup_test_db};

#[tokio::test]
async fn upsert_and_find_one_round_trip() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut p = posting("remoteok", "42");
    p.ai_class = Some(RoleLabel::FullStack);
    p.ai_reasoning = Some("mentions React/Vue; mentions backend + frontend stack".into());
    p.tags = vec!["Django".into(), "React".into()];

    assert_eq!(repo.upsert(std::slice::from_ref(&p)).await.unwrap(), 1);

    let stored = repo
        .find_one("remoteok", "42")
        .await
        .unwrap()
        .expect("Should find the posting");
    assert_eq!(stored, p);

    assert!(repo.find_one("remoteok", "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_replaces_by_natural_key() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let first = posting("arbeitnow", "a");
    repo.upsert(&[first]).await.unwrap();

    let mut second = posting("arbeitnow", "a");
    second.title = "Staff Backend Engineer".into();
    second.ai_class = Some(RoleLabel::Backend);
    second.ai_reasoning = Some("mentions backend frameworks/databases".into());
    repo.upsert(&[second]).await.unwrap();

    let all = repo.find(&JobFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Staff Backend Engineer");
    assert_eq!(all[0].ai_class, Some(RoleLabel::Backend));
}

#[tokio::test]
async fn find_orders_newest_first_with_undated_last() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut old = posting("s", "old");
    old.published_at = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    let mut new = posting("s", "new");
    new.published_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    let mut undated = posting("s", "undated");
    undated.published_at = None;
    let mut tie_b = posting("s", "b");
    tie_b.published_at = Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
    let mut tie_a = posting("s", "a");
    tie_a.published_at = tie_b.published_at;

    repo.upsert(&[undated, old, tie_b, new, tie_a]).await.unwrap();

    let ids: Vec<String> = repo
        .find(&JobFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.source_id)
        .collect();
    assert_eq!(ids, vec!["new", "a", "b", "old", "undated"]);
}

#[tokio::test]
async fn find_applies_query_role_and_skill() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut django = posting("s", "1");
    django.ai_class = Some(RoleLabel::Backend);
    django.ai_reasoning = Some("r".into());
    django.tags = vec!["Django".into(), "SQL".into()];

    let mut react = posting("s", "2");
    react.title = "Frontend Developer".into();
    react.company = "Pixel AG".into();
    react.location = "Munich".into();
    react.ai_class = Some(RoleLabel::Frontend);
    react.ai_reasoning = Some("r".into());
    react.tags = vec!["React".into()];

    repo.upsert(&[django, react]).await.unwrap();

    let by_query = repo
        .find(&JobFilter::default().with_query("  PIXEL "))
        .await
        .unwrap();
    assert_eq!(by_query.len(), 1);
    assert_eq!(by_query[0].source_id, "2");

    let by_location = repo
        .find(&JobFilter::default().with_query("berlin"))
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].source_id, "1");

    let by_role = repo
        .find(&JobFilter::default().with_role(RoleLabel::Frontend))
        .await
        .unwrap();
    assert_eq!(by_role.len(), 1);
    assert_eq!(by_role[0].source_id, "2");

    let by_skill = repo
        .find(&JobFilter::default().with_skill("SQL"))
        .await
        .unwrap();
    assert_eq!(by_skill.len(), 1);
    assert_eq!(by_skill[0].source_id, "1");

    let combined = repo
        .find(
            &JobFilter::default()
                .with_role(RoleLabel::Backend)
                .with_skill("React"),
        )
        .await
        .unwrap();
    assert!(combined.is_empty());
}

#[tokio::test]
async fn skill_distribution_counts_and_ties() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut a = posting("s", "1");
    a.tags = vec!["Python".into(), "SQL".into()];
    let mut b = posting("s", "2");
    b.tags = vec!["Python".into(), "Docker".into()];
    let c = posting("s", "3");
    repo.upsert(&[a, b, c]).await.unwrap();

    let distribution = repo.skill_distribution().await.unwrap();
    assert_eq!(
        distribution,
        vec![
            SkillCount {
                skill: "Python".into(),
                count: 2
            },
            SkillCount {
                skill: "Docker".into(),
                count: 1
            },
            SkillCount {
                skill: "SQL".into(),
                count: 1
            },
        ]
    );
}

#[tokio::test]
async fn roles_are_distinct_and_sorted() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut a = posting("s", "1");
    a.ai_class = Some(RoleLabel::Other);
    let mut b = posting("s", "2");
    b.ai_class = Some(RoleLabel::DataMl);
    let mut c = posting("s", "3");
    c.ai_class = Some(RoleLabel::Other);
    let d = posting("s", "4");
    repo.upsert(&[a, b, c, d]).await.unwrap();

    assert_eq!(
        repo.roles().await.unwrap(),
        vec![RoleLabel::DataMl, RoleLabel::Other]
    );
}

#[tokio::test]
async fn health_check_and_idempotent_migrations() {
    let (pool, _container) = setup_test_db().await;

    Database::from_pool(pool.clone()).migrate().await.unwrap();
    JobRepository::new(pool).health_check().await.unwrap();
}
