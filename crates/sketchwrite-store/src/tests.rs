use uuid::Uuid;

use sketchwrite_types::models::{
    ContentKind, NewComment, NewPrompt, NewSubmission, NewUser, Prompt, Role, Submission, User,
};

use crate::{MemoryStore, SqliteStore, Store, StoreError, seed};

/// Every case runs against both store implementations; the contract is
/// the same either way.
fn each_store(test: impl Fn(&dyn Store)) {
    let mem = MemoryStore::new();
    test(&mem);
    let sqlite = SqliteStore::open_in_memory().expect("open in-memory sqlite");
    test(&sqlite);
}

fn make_user(store: &dyn Store, username: &str) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            password: "placeholder".to_string(),
            name: username.to_string(),
            avatar: None,
        })
        .expect("create user")
}

fn make_prompt(
    store: &dyn Store,
    creator: &User,
    role: Role,
    kind: ContentKind,
    is_daily: bool,
    likes: i64,
) -> Prompt {
    store
        .create_prompt(NewPrompt {
            creator_id: creator.id,
            creator_role: role,
            kind,
            content: match kind {
                ContentKind::Text => "a story seed".to_string(),
                ContentKind::Image => "/uploads/example.png".to_string(),
            },
            is_active: true,
            is_daily,
            likes,
        })
        .expect("create prompt")
}

fn make_submission(
    store: &dyn Store,
    prompt: &Prompt,
    user: Option<&User>,
    kind: ContentKind,
) -> Submission {
    store
        .create_submission(NewSubmission {
            prompt_id: prompt.id,
            user_id: user.map(|u| u.id),
            kind,
            content: match kind {
                ContentKind::Text => "a response".to_string(),
                ContentKind::Image => "/uploads/response.png".to_string(),
            },
        })
        .expect("create submission")
}

#[test]
fn role_feed_returns_only_opposite_role_prompts() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let sketcher = make_user(store, "sketcher");
        make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        make_prompt(store, &sketcher, Role::Sketcher, ContentKind::Image, false, 0);

        let for_sketchers = store.list_prompts_for_role(Role::Sketcher).expect("list");
        assert_eq!(for_sketchers.len(), 2);
        assert!(for_sketchers.iter().all(|p| p.creator_role == Role::Writer));

        let for_writers = store.list_prompts_for_role(Role::Writer).expect("list");
        assert_eq!(for_writers.len(), 1);
        assert!(for_writers.iter().all(|p| p.creator_role == Role::Sketcher));
    });
}

#[test]
fn role_feed_puts_daily_prompts_first_regardless_of_age() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        // The daily prompt is created first, so it is the *older* one.
        let daily = make_prompt(store, &writer, Role::Writer, ContentKind::Text, true, 0);
        let newer = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);

        let feed = store.list_prompts_for_role(Role::Sketcher).expect("list");
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, daily.id);
        assert_eq!(feed[1].id, newer.id);
    });
}

#[test]
fn role_feed_orders_newest_first_within_a_flag_group() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let older = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let newer = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);

        let feed = store.list_prompts_for_role(Role::Sketcher).expect("list");
        assert_eq!(feed[0].id, newer.id);
        assert_eq!(feed[1].id, older.id);
    });
}

#[test]
fn popular_prompts_order_by_likes_and_truncate() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 5);
        let top = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 50);
        let mid = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 20);

        let popular = store.list_popular_prompts(2).expect("list");
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].id, top.id);
        assert_eq!(popular[1].id, mid.id);
    });
}

#[test]
fn daily_listing_contains_only_flagged_prompts() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let daily = make_prompt(store, &writer, Role::Writer, ContentKind::Text, true, 0);
        make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);

        let listed = store.list_daily_prompts().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, daily.id);
    });
}

#[test]
fn creating_a_submission_bumps_the_prompt_contribution_counter() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        assert_eq!(prompt.contributions, 0);

        make_submission(store, &prompt, None, ContentKind::Image);
        assert_eq!(store.get_prompt(prompt.id).expect("get").contributions, 1);

        make_submission(store, &prompt, None, ContentKind::Image);
        assert_eq!(store.get_prompt(prompt.id).expect("get").contributions, 2);
    });
}

#[test]
fn submitting_to_a_missing_prompt_is_not_found() {
    each_store(|store| {
        let err = store
            .create_submission(NewSubmission {
                prompt_id: Uuid::new_v4(),
                user_id: None,
                kind: ContentKind::Image,
                content: "/uploads/x.png".to_string(),
            })
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound));
    });
}

#[test]
fn prompt_with_no_submissions_lists_empty() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let subs = store.list_submissions_for_prompt(prompt.id).expect("list");
        assert!(subs.is_empty());
    });
}

#[test]
fn submissions_list_newest_first() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let older = make_submission(store, &prompt, None, ContentKind::Image);
        let newer = make_submission(store, &prompt, None, ContentKind::Image);

        let subs = store.list_submissions_for_prompt(prompt.id).expect("list");
        assert_eq!(subs[0].id, newer.id);
        assert_eq!(subs[1].id, older.id);
    });
}

#[test]
fn duplicate_likes_never_double_count() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let liker = make_user(store, "liker");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let sub = make_submission(store, &prompt, None, ContentKind::Image);

        store.create_like(liker.id, sub.id).expect("like");
        store.create_like(liker.id, sub.id).expect("duplicate like");
        assert_eq!(store.get_submission(sub.id).expect("get").likes, 1);
        assert!(store.has_like(liker.id, sub.id).expect("has_like"));
    });
}

#[test]
fn like_then_unlike_restores_the_counter_and_never_goes_negative() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let liker = make_user(store, "liker");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let sub = make_submission(store, &prompt, None, ContentKind::Image);

        for _ in 0..3 {
            store.create_like(liker.id, sub.id).expect("like");
            store.delete_like(liker.id, sub.id).expect("unlike");
        }
        assert_eq!(store.get_submission(sub.id).expect("get").likes, 0);

        // Unliking without a like is a no-op, not an underflow.
        store.delete_like(liker.id, sub.id).expect("unlike again");
        assert_eq!(store.get_submission(sub.id).expect("get").likes, 0);
        assert!(!store.has_like(liker.id, sub.id).expect("has_like"));
    });
}

#[test]
fn comments_bump_the_counter_and_list_oldest_first() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let sub = make_submission(store, &prompt, None, ContentKind::Image);

        let first = store
            .create_comment(NewComment {
                submission_id: sub.id,
                user_id: Some(writer.id),
                content: "first".to_string(),
            })
            .expect("comment");
        let second = store
            .create_comment(NewComment {
                submission_id: sub.id,
                user_id: None,
                content: "second".to_string(),
            })
            .expect("comment");

        assert_eq!(store.get_submission(sub.id).expect("get").comments, 2);
        let listed = store.list_comments_for_submission(sub.id).expect("list");
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    });
}

#[test]
fn commenting_on_a_missing_submission_is_not_found() {
    each_store(|store| {
        let err = store
            .create_comment(NewComment {
                submission_id: Uuid::new_v4(),
                user_id: None,
                content: "hello".to_string(),
            })
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound));
    });
}

#[test]
fn unknown_actor_ids_are_rejected_uniformly() {
    each_store(|store| {
        let writer = make_user(store, "writer");
        let prompt = make_prompt(store, &writer, Role::Writer, ContentKind::Text, false, 0);
        let sub = make_submission(store, &prompt, None, ContentKind::Image);
        let ghost = Uuid::new_v4();

        let err = store.create_like(ghost, sub.id).expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(store.get_submission(sub.id).expect("get").likes, 0);

        let err = store
            .create_submission(NewSubmission {
                prompt_id: prompt.id,
                user_id: Some(ghost),
                kind: ContentKind::Image,
                content: "/uploads/x.png".to_string(),
            })
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(store.get_prompt(prompt.id).expect("get").contributions, 1);

        let err = store
            .create_comment(NewComment {
                submission_id: sub.id,
                user_id: Some(ghost),
                content: "hello".to_string(),
            })
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(store.get_submission(sub.id).expect("get").comments, 0);
    });
}

#[test]
fn unknown_ids_are_not_found() {
    each_store(|store| {
        assert!(matches!(
            store.get_prompt(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.get_submission(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
        assert!(store.get_user(Uuid::new_v4()).expect("get_user").is_none());
    });
}

#[test]
fn reseeding_a_populated_store_is_a_no_op() {
    each_store(|store| {
        assert!(seed::run_if_empty(store).expect("seed"));
        let first_feed = store.list_prompts_for_role(Role::Sketcher).expect("list");

        // A second pass, as on server restart, must not duplicate rows.
        assert!(!seed::run_if_empty(store).expect("reseed"));
        assert_eq!(store.count_users().expect("count"), 5);
        let second_feed = store.list_prompts_for_role(Role::Sketcher).expect("list");
        assert_eq!(second_feed.len(), first_feed.len());
    });
}

#[test]
fn seed_populates_both_sides_of_the_feed() {
    each_store(|store| {
        seed::run(store).expect("seed");
        assert_eq!(store.count_users().expect("count"), 5);

        let for_sketchers = store.list_prompts_for_role(Role::Sketcher).expect("list");
        let for_writers = store.list_prompts_for_role(Role::Writer).expect("list");
        assert_eq!(for_sketchers.len(), 2);
        assert_eq!(for_writers.len(), 2);
        // Each feed leads with its daily prompt.
        assert!(for_sketchers[0].is_daily);
        assert!(for_writers[0].is_daily);

        // At least one text prompt has an image submission, so the
        // collaboration feed is non-empty out of the box.
        let paired = store
            .list_text_prompts(5)
            .expect("list")
            .iter()
            .any(|p| {
                store
                    .newest_image_submission(p.id)
                    .expect("newest image")
                    .is_some()
            });
        assert!(paired);
    });
}
