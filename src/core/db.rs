use spin_sdk::key_value::Store;
use crate::models::models::{User, Post};
use crate::config::{user_key, post_key, USERS_LIST_KEY, POSTS_LIST_KEY};

// The KV layout mirrors the record/index split: one JSON record per entity
// (`user:{id}`, `post:{id}`) plus an id list per collection. The posts list
// keeps newest first.
//
// Uniqueness checks below are read-then-write; the KV store offers no
// unique constraint, so concurrent duplicate registrations can race. See
// DESIGN.md.

pub fn list_user_ids(store: &Store) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(USERS_LIST_KEY)?.unwrap_or_default())
}

pub fn load_user(store: &Store, id: &str) -> anyhow::Result<Option<User>> {
    Ok(store.get_json::<User>(&user_key(id))?)
}

pub fn insert_user(store: &Store, user: &User) -> anyhow::Result<()> {
    store.set_json(&user_key(&user.id), user)?;
    let mut ids = list_user_ids(store)?;
    ids.push(user.id.clone());
    store.set_json(USERS_LIST_KEY, &ids)?;
    Ok(())
}

/// Look a user up by email or username. Login accepts either.
pub fn find_user_by_login(store: &Store, login: &str) -> anyhow::Result<Option<User>> {
    for id in list_user_ids(store)? {
        if let Some(u) = load_user(store, &id)? {
            if u.email == login || u.username == login {
                return Ok(Some(u));
            }
        }
    }
    Ok(None)
}

pub fn username_taken(store: &Store, username: &str) -> anyhow::Result<bool> {
    for id in list_user_ids(store)? {
        if let Some(u) = load_user(store, &id)? {
            if u.username == username {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn email_taken(store: &Store, email: &str) -> anyhow::Result<bool> {
    for id in list_user_ids(store)? {
        if let Some(u) = load_user(store, &id)? {
            if u.email == email {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn list_post_ids(store: &Store) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(POSTS_LIST_KEY)?.unwrap_or_default())
}

pub fn load_post(store: &Store, id: &str) -> anyhow::Result<Option<Post>> {
    Ok(store.get_json::<Post>(&post_key(id))?)
}

pub fn save_post(store: &Store, post: &Post) -> anyhow::Result<()> {
    store.set_json(&post_key(&post.id), post)?;
    Ok(())
}

pub fn insert_post(store: &Store, post: &Post) -> anyhow::Result<()> {
    save_post(store, post)?;
    let mut ids = list_post_ids(store)?;
    ids.insert(0, post.id.clone()); // prepend newest
    store.set_json(POSTS_LIST_KEY, &ids)?;
    Ok(())
}

pub fn remove_post(store: &Store, id: &str) -> anyhow::Result<()> {
    store.delete(&post_key(id))?;
    let mut ids = list_post_ids(store)?;
    ids.retain(|p| p != id);
    store.set_json(POSTS_LIST_KEY, &ids)?;
    Ok(())
}

/// Delete a user and every post they own. Not transactional; a sequence of
/// KV deletes.
pub fn delete_user_cascade(store: &Store, user_id: &str) -> anyhow::Result<()> {
    let mut post_ids = list_post_ids(store)?;
    let mut kept = Vec::with_capacity(post_ids.len());
    for id in post_ids.drain(..) {
        match load_post(store, &id)? {
            Some(p) if p.user_id == user_id => {
                store.delete(&post_key(&id))?;
            }
            Some(_) => kept.push(id),
            None => {}
        }
    }
    store.set_json(POSTS_LIST_KEY, &kept)?;

    store.delete(&user_key(user_id))?;
    let mut user_ids = list_user_ids(store)?;
    user_ids.retain(|u| u != user_id);
    store.set_json(USERS_LIST_KEY, &user_ids)?;

    Ok(())
}
