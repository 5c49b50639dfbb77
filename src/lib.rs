use spin_sdk::http::{Request, Response};
#[cfg(target_arch = "wasm32")]
use spin_sdk::{http::IntoResponse, http_component};

pub mod auth;
pub mod authz;
pub mod config;
pub mod posts;
pub mod token;
pub mod users;

pub mod core {
    pub mod db;
    pub mod errors;
    pub mod helpers;
    pub mod params;
}

pub mod models {
    pub mod models;
}

// === Component entrypoint ===
#[cfg(target_arch = "wasm32")]
#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    route(req)
}

/// Route table for the whole API surface. Shared between the Spin
/// component and the native binary.
pub fn route(req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/api/users") => users::create_user(req),
        ("POST", "/api/users/token") => auth::login_user(req),
        ("DELETE", p) if p.starts_with("/api/users/") => users::delete_user(req),
        ("GET", p) if p.starts_with("/api/users/") => users::get_user_details(p),
        ("GET", "/api/posts") => posts::list_posts(req),
        ("POST", "/api/posts") => posts::create_post(req),
        ("GET", p) if p.starts_with("/api/posts/") => posts::get_post(req),
        ("PUT", p) if p.starts_with("/api/posts/") => posts::update_post(req),
        ("DELETE", p) if p.starts_with("/api/posts/") => posts::delete_post(req),
        _ => Ok(Response::builder().status(404).body("Not found").build()),
    }
}
