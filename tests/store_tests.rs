//! Store-level behaviour: references, uniqueness, cascade deletes and ordering.

use content_manager::domain::model::{
    CascadeSummary, CommentChanges, NewComment, NewPost, NewUser, PostChanges, UserChanges,
};
use content_manager::{ContentStore, StoreError};
use std::sync::Arc;

async fn store() -> ContentStore {
    let store = ContentStore::open_in_memory().await.unwrap();
    store.init().await.unwrap();
    store
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser::new(Some(username.to_string()), Some(email.to_string())).unwrap()
}

fn new_post(content: &str, owner_id: i64) -> NewPost {
    NewPost::new(Some(content.to_string()), owner_id).unwrap()
}

fn new_comment(text: &str, post_id: i64) -> NewComment {
    NewComment::new(Some(text.to_string()), post_id).unwrap()
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, StoreError>, entity: &str, id: i64) {
    match result {
        Err(StoreError::NotFound { entity: e, id: i }) => {
            assert_eq!(e, entity);
            assert_eq!(i, id);
        }
        other => panic!("expected {} {} not found, got {:?}", entity, id, other),
    }
}

fn assert_conflict<T: std::fmt::Debug>(result: Result<T, StoreError>, field: &str) {
    match result {
        Err(StoreError::Conflict { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected conflict on {}, got {:?}", field, other),
    }
}

#[tokio::test]
async fn alice_posts_and_comments_scenario() {
    let store = store().await;

    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    assert_eq!(alice.id, 1);
    let post = store.create_post(new_post("hi", alice.id)).await.unwrap();
    assert_eq!(post.id, 1);
    let comment = store.create_comment(new_comment("nice", post.id)).await.unwrap();
    assert_eq!(comment.id, 1);

    let posts = store.list_posts_for_user(1).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 1);
    assert_eq!(posts[0].content, "hi");
    assert_eq!(posts[0].owner_id, 1);
}

#[tokio::test]
async fn created_records_read_back_unchanged() {
    let store = store().await;

    let user = store.create_user(new_user("bob", "bob@x.com")).await.unwrap();
    assert_eq!(store.get_user(user.id).await.unwrap(), user);
    assert_eq!(user.username, "bob");
    assert_eq!(user.email, "bob@x.com");

    let post = store.create_post(new_post("first", user.id)).await.unwrap();
    assert_eq!(store.get_post(post.id).await.unwrap(), post);

    let comment = store.create_comment(new_comment("reply", post.id)).await.unwrap();
    assert_eq!(store.get_comment(comment.id).await.unwrap(), comment);
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let store = store().await;
    store.create_user(new_user("alice", "a@x.com")).await.unwrap();

    assert_conflict(store.create_user(new_user("alice", "b@x.com")).await, "username");
    assert_conflict(store.create_user(new_user("carol", "a@x.com")).await, "email");

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_user_keeps_uniqueness() {
    let store = store().await;
    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let bob = store.create_user(new_user("bob", "b@x.com")).await.unwrap();

    let taken = UserChanges::new(Some("alice".into()), Some("new@x.com".into())).unwrap();
    assert_conflict(store.update_user(bob.id, taken).await, "username");

    let taken = UserChanges::new(Some("bobby".into()), Some("a@x.com".into())).unwrap();
    assert_conflict(store.update_user(bob.id, taken).await, "email");

    // Re-saving a user's own values is not a conflict.
    let same = UserChanges::new(Some("alice".into()), Some("a@x.com".into())).unwrap();
    assert_eq!(store.update_user(alice.id, same).await.unwrap(), alice);

    let renamed = UserChanges::new(Some("bobby".into()), Some("bobby@x.com".into())).unwrap();
    let updated = store.update_user(bob.id, renamed).await.unwrap();
    assert_eq!(store.get_user(bob.id).await.unwrap(), updated);
    assert_eq!(updated.username, "bobby");
}

#[tokio::test]
async fn missing_parents_are_not_found() {
    let store = store().await;

    assert_not_found(store.create_post(new_post("x", 999)).await, "user", 999);
    assert_not_found(store.create_comment(new_comment("x", 42)).await, "post", 42);
    assert_not_found(store.list_posts_for_user(7).await, "user", 7);
    assert_not_found(store.list_comments_for_post(7).await, "post", 7);
    assert_not_found(store.get_user_with_posts(7).await, "user", 7);

    let counts = store.counts().await.unwrap();
    assert_eq!((counts.users, counts.posts, counts.comments), (0, 0, 0));
}

#[tokio::test]
async fn operations_on_absent_records_are_not_found() {
    let store = store().await;

    assert_not_found(store.get_user(1).await, "user", 1);
    assert_not_found(store.get_post(1).await, "post", 1);
    assert_not_found(store.get_comment(1).await, "comment", 1);

    let changes = UserChanges::new(Some("x".into()), Some("x@x.com".into())).unwrap();
    assert_not_found(store.update_user(1, changes).await, "user", 1);
    let changes = PostChanges::new(Some("x".into())).unwrap();
    assert_not_found(store.update_post(1, changes).await, "post", 1);
    let changes = CommentChanges::new(Some("x".into())).unwrap();
    assert_not_found(store.update_comment(1, changes).await, "comment", 1);

    assert_not_found(store.delete_user(1).await, "user", 1);
    assert_not_found(store.delete_post(1).await, "post", 1);
    assert_not_found(store.delete_comment(1).await, "comment", 1);
}

#[tokio::test]
async fn update_touches_content_only() {
    let store = store().await;
    let user = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let post = store.create_post(new_post("draft", user.id)).await.unwrap();
    let comment = store.create_comment(new_comment("typo", post.id)).await.unwrap();

    let post = store
        .update_post(post.id, PostChanges::new(Some("final".into())).unwrap())
        .await
        .unwrap();
    assert_eq!(post.content, "final");
    assert_eq!(post.owner_id, user.id);
    assert_eq!(store.get_post(post.id).await.unwrap(), post);

    let comment = store
        .update_comment(comment.id, CommentChanges::new(Some("fixed".into())).unwrap())
        .await
        .unwrap();
    assert_eq!(comment.text, "fixed");
    assert_eq!(comment.post_id, post.id);
    assert_eq!(store.get_comment(comment.id).await.unwrap(), comment);
}

#[tokio::test]
async fn deleted_records_are_gone() {
    let store = store().await;
    let user = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let post = store.create_post(new_post("hi", user.id)).await.unwrap();
    let comment = store.create_comment(new_comment("nice", post.id)).await.unwrap();

    store.delete_comment(comment.id).await.unwrap();
    assert_not_found(store.get_comment(comment.id).await, "comment", comment.id);
    assert_not_found(store.delete_comment(comment.id).await, "comment", comment.id);

    // The parent post is untouched.
    assert_eq!(store.get_post(post.id).await.unwrap(), post);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_posts_and_comments() {
    let store = store().await;
    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let bob = store.create_user(new_user("bob", "b@x.com")).await.unwrap();

    let p1 = store.create_post(new_post("hi", alice.id)).await.unwrap();
    let p2 = store.create_post(new_post("again", alice.id)).await.unwrap();
    let bobs = store.create_post(new_post("mine", bob.id)).await.unwrap();
    let c1 = store.create_comment(new_comment("nice", p1.id)).await.unwrap();
    store.create_comment(new_comment("+1", p2.id)).await.unwrap();
    store.create_comment(new_comment("+2", p2.id)).await.unwrap();
    let on_bobs = store.create_comment(new_comment("ok", bobs.id)).await.unwrap();

    let removed = store.delete_user(alice.id).await.unwrap();
    assert_eq!(removed, CascadeSummary { posts: 2, comments: 3 });

    assert_not_found(store.get_user(alice.id).await, "user", alice.id);
    assert_not_found(store.get_post(p1.id).await, "post", p1.id);
    assert_not_found(store.get_post(p2.id).await, "post", p2.id);
    assert_not_found(store.get_comment(c1.id).await, "comment", c1.id);

    // Other users' data survives.
    assert_eq!(store.get_post(bobs.id).await.unwrap(), bobs);
    assert_eq!(store.get_comment(on_bobs.id).await.unwrap(), on_bobs);

    let counts = store.counts().await.unwrap();
    assert_eq!((counts.users, counts.posts, counts.comments), (1, 1, 1));
}

#[tokio::test]
async fn deleting_a_post_cascades_to_comments() {
    let store = store().await;
    let user = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let post = store.create_post(new_post("hi", user.id)).await.unwrap();
    let keep = store.create_post(new_post("keep", user.id)).await.unwrap();
    let c1 = store.create_comment(new_comment("a", post.id)).await.unwrap();
    store.create_comment(new_comment("b", post.id)).await.unwrap();
    store.create_comment(new_comment("c", keep.id)).await.unwrap();

    let removed = store.delete_post(post.id).await.unwrap();
    assert_eq!(removed, CascadeSummary { posts: 0, comments: 2 });
    assert_not_found(store.get_comment(c1.id).await, "comment", c1.id);
    assert_not_found(store.list_comments_for_post(post.id).await, "post", post.id);

    assert_eq!(store.list_posts_for_user(user.id).await.unwrap(), vec![keep.clone()]);
    assert_eq!(store.list_comments_for_post(keep.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let store = store().await;
    let first = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    store.delete_user(first.id).await.unwrap();

    let second = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    assert!(second.id > first.id);
    assert_not_found(store.get_user(first.id).await, "user", first.id);
}

#[tokio::test]
async fn children_are_listed_in_insertion_order() {
    let store = store().await;
    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let bob = store.create_user(new_user("bob", "b@x.com")).await.unwrap();

    let a1 = store.create_post(new_post("one", alice.id)).await.unwrap();
    store.create_post(new_post("bob's", bob.id)).await.unwrap();
    let a2 = store.create_post(new_post("two", alice.id)).await.unwrap();
    let a3 = store.create_post(new_post("three", alice.id)).await.unwrap();

    let ids: Vec<i64> = store
        .list_posts_for_user(alice.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![a1.id, a2.id, a3.id]);

    let first = store.create_comment(new_comment("first", a2.id)).await.unwrap();
    let second = store.create_comment(new_comment("second", a2.id)).await.unwrap();
    assert_eq!(
        store.list_comments_for_post(a2.id).await.unwrap(),
        vec![first, second]
    );
}

#[tokio::test]
async fn user_with_posts_groups_comments_by_post() {
    let store = store().await;
    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    let quiet = store.create_post(new_post("quiet", alice.id)).await.unwrap();
    let busy = store.create_post(new_post("busy", alice.id)).await.unwrap();
    let c1 = store.create_comment(new_comment("a", busy.id)).await.unwrap();
    let c2 = store.create_comment(new_comment("b", busy.id)).await.unwrap();

    let page = store.get_user_with_posts(alice.id).await.unwrap();
    assert_eq!(page.user, alice);
    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].post, quiet);
    assert!(page.posts[0].comments.is_empty());
    assert_eq!(page.posts[1].post, busy);
    assert_eq!(page.posts[1].comments, vec![c1, c2]);
}

#[tokio::test]
async fn init_is_idempotent_and_keeps_data() {
    let store = store().await;
    store.create_user(new_user("alice", "a@x.com")).await.unwrap();

    store.init().await.unwrap();
    store.ping().await.unwrap();
    assert_eq!(store.counts().await.unwrap().users, 1);
}

/// A store on a real file with several pooled connections, so writers can contend.
async fn file_store(dir: &tempfile::TempDir) -> Arc<ContentStore> {
    let url = format!("sqlite://{}", dir.path().join("content.db").display());
    let store = ContentStore::open(&url, 4).await.unwrap();
    store.init().await.unwrap();
    Arc::new(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_users_resolve_to_one_winner_and_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir).await;

    for round in 0..20 {
        let username = format!("user{}", round);
        let mut writers = tokio::task::JoinSet::new();
        for writer in 0..4 {
            let store = store.clone();
            let input = new_user(&username, &format!("{}-{}@x.com", username, writer));
            writers.spawn(async move { store.create_user(input).await });
        }

        let (mut created, mut conflicts) = (0, 0);
        while let Some(joined) = writers.join_next().await {
            match joined.unwrap() {
                Ok(user) => {
                    assert_eq!(user.username, username);
                    created += 1;
                }
                Err(StoreError::Conflict { field, .. }) => {
                    assert_eq!(field, "username");
                    conflicts += 1;
                }
                Err(other) => panic!("round {}: unexpected error {:?}", round, other),
            }
        }
        assert_eq!((created, conflicts), (1, 3), "round {}", round);
    }

    assert_eq!(store.list_users().await.unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_one_parent_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir).await;
    let owner_id = store.create_user(new_user("alice", "a@x.com")).await.unwrap().id;

    let mut writers = tokio::task::JoinSet::new();
    for i in 0..16 {
        let store = store.clone();
        writers.spawn(async move {
            store
                .create_post(new_post(&format!("post {}", i), owner_id))
                .await
                .map(|_| ())
        });
    }
    while let Some(joined) = writers.join_next().await {
        joined.unwrap().unwrap();
    }

    // A writer racing a delete of the parent sees NotFound or succeeds before it, never a
    // driver error.
    let post_id = store.create_post(new_post("last", owner_id)).await.unwrap().id;
    let mut writers = tokio::task::JoinSet::new();
    for i in 0..8 {
        let store = store.clone();
        writers.spawn(async move {
            store
                .create_comment(new_comment(&format!("c{}", i), post_id))
                .await
                .map(|_| ())
        });
    }
    let deleter = {
        let store = store.clone();
        tokio::spawn(async move { store.delete_user(owner_id).await })
    };
    while let Some(joined) = writers.join_next().await {
        match joined.unwrap() {
            Ok(()) => {}
            Err(StoreError::NotFound { entity, id }) => {
                assert_eq!(entity, "post");
                assert_eq!(id, post_id);
            }
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    let summary = deleter.await.unwrap().unwrap();
    assert_eq!(summary.posts, 17);

    let counts = store.counts().await.unwrap();
    assert_eq!((counts.users, counts.posts, counts.comments), (0, 0, 0));
}
