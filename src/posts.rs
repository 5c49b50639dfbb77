use spin_sdk::http::{Request, Response};
use ammonia::Builder;
use html_escape::encode_double_quoted_attribute;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::authz::{authorize, Decision, Operation, Resource};
use crate::config::*;
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{now_iso, sanitize_text, store, validate_uuid};
use crate::models::models::Post;

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"https?://[^\s]+").expect("Regex should compile")
    })
}

fn filter_post_content(content: &str) -> String {
    // Sanitize HTML to remove dangerous scripts and event handlers
    let clean = Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string();

    // Convert HTTP/HTTPS URLs into clickable links with proper escaping
    url_regex()
        .replace_all(&clean, |caps: &regex::Captures| {
            let url = &caps[0];
            let escaped_url = encode_double_quoted_attribute(url);
            format!(r#"<a href="{}" target="_blank">{}</a>"#, escaped_url, url)
        })
        .to_string()
}

fn validate_post_fields(title: &str, content: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if title.is_empty() {
        fields.push(("title".to_string(), "Title is required".to_string()));
    } else if title.len() > MAX_TITLE_LENGTH {
        fields.push((
            "title".to_string(),
            format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
        ));
    }
    if content.is_empty() {
        fields.push(("content".to_string(), "Content is required".to_string()));
    } else if content.len() > MAX_CONTENT_LENGTH {
        fields.push((
            "content".to_string(),
            format!("Content must be at most {} characters", MAX_CONTENT_LENGTH),
        ));
    }
    fields
}

fn post_id_from(path: &str) -> &str {
    path.split('/').last().unwrap_or("")
}

/// GET /api/posts — public, newest first.
pub fn list_posts(_req: Request) -> anyhow::Result<Response> {
    let store = store();

    let mut posts = Vec::new();
    for id in db::list_post_ids(&store)? {
        if let Some(p) = db::load_post(&store, &id)? {
            posts.push(p);
        }
    }

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&posts)?)
        .build())
}

/// GET /api/posts/{id} — public.
pub fn get_post(req: Request) -> anyhow::Result<Response> {
    let path = req.path();
    let post_id = post_id_from(path);

    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    if let Some(post) = db::load_post(&store, post_id)? {
        Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&post)?)
            .build())
    } else {
        Ok(ApiError::NotFound("Post not found".to_string()).into())
    }
}

/// POST /api/posts — authenticated; the actor becomes the owner.
pub fn create_post(req: Request) -> anyhow::Result<Response> {
    let actor_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(e) => return Ok(e.into()),
    };

    let value: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => {
            return Ok(ApiError::Validation(vec![(
                "body".to_string(),
                "Request body must be JSON".to_string(),
            )])
            .into())
        }
    };
    let title = value["title"].as_str().unwrap_or_default();
    let content = value["content"].as_str().unwrap_or_default();

    let fields = validate_post_fields(title, content);
    if !fields.is_empty() {
        return Ok(ApiError::Validation(fields).into());
    }

    let post = Post {
        id: Uuid::new_v4().to_string(),
        user_id: actor_id,
        title: sanitize_text(title),
        content: filter_post_content(content),
        created_at: now_iso(),
    };

    let store = store();
    db::insert_post(&store, &post)?;

    Ok(Response::builder()
        .status(201)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&post)?)
        .build())
}

/// PUT /api/posts/{id} — owner only. Title and content are replaced; a
/// `user_id` in the body reassigns ownership, and the new owner must
/// exist.
pub fn update_post(req: Request) -> anyhow::Result<Response> {
    let actor_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(e) => return Ok(e.into()),
    };

    let path = req.path();
    let post_id = post_id_from(path);

    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    let mut post = match db::load_post(&store, post_id)? {
        Some(p) => p,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    if let Decision::Deny(reason) =
        authorize(&actor_id, &post.user_id, Resource::Post, Operation::Update)
    {
        return Ok(ApiError::Forbidden(reason).into());
    }

    let value: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => {
            return Ok(ApiError::Validation(vec![(
                "body".to_string(),
                "Request body must be JSON".to_string(),
            )])
            .into())
        }
    };
    let title = value["title"].as_str().unwrap_or_default();
    let content = value["content"].as_str().unwrap_or_default();

    let fields = validate_post_fields(title, content);
    if !fields.is_empty() {
        return Ok(ApiError::Validation(fields).into());
    }

    if let Some(new_owner) = value["user_id"].as_str() {
        if new_owner != post.user_id {
            if db::load_user(&store, new_owner)?.is_none() {
                return Ok(ApiError::NotFound("User not found".to_string()).into());
            }
            post.user_id = new_owner.to_string();
        }
    }

    post.title = sanitize_text(title);
    post.content = filter_post_content(content);
    db::save_post(&store, &post)?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&post)?)
        .build())
}

/// DELETE /api/posts/{id} — owner only.
pub fn delete_post(req: Request) -> anyhow::Result<Response> {
    let actor_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(e) => return Ok(e.into()),
    };

    let path = req.path();
    let post_id = post_id_from(path);

    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    let post = match db::load_post(&store, post_id)? {
        Some(p) => p,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    if let Decision::Deny(reason) =
        authorize(&actor_id, &post.user_id, Resource::Post, Operation::Delete)
    {
        return Ok(ApiError::Forbidden(reason).into());
    }

    db::remove_post(&store, post_id)?;

    Ok(Response::builder().status(204).build())
}
