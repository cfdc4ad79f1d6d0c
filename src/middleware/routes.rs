use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::attribution::track_attribution;
use super::config::GateConfig;
use super::error::GateError;
use super::extractor::{Attribution, PeekSession, RequireSession};
use super::state::PageState;
use crate::attribution::AttributionRecord;
use crate::directory::UserDirectory;
use crate::page::PageView;
use crate::types::{SessionResult, UserId};

/// Create the page router.
///
/// - `/customize`, `/checkout`: strict, redirect to login without a session
/// - `/nav`: shared layout data, tolerant
/// - `/me`: strict, then redirect to the user's public profile
/// - `/{username}`: public profile, tolerant, captures attribution
pub fn page_routes<D: UserDirectory>(config: GateConfig, directory: D) -> Router {
    let state = PageState {
        config: config.clone(),
        directory: Arc::new(directory),
    };

    let profile_pages = Router::new()
        .route("/{username}", get(profile))
        .layer(axum::middleware::from_fn_with_state(config, track_attribution));

    Router::new()
        .route("/customize", get(customize))
        .route("/checkout", get(checkout))
        .route("/nav", get(nav))
        .route("/me", get(me::<D>))
        .merge(profile_pages)
        .with_state(state)
}

// ── Strict pages ───────────────────────────────────────────────────

async fn customize(RequireSession(user_id): RequireSession) -> Json<PageView> {
    Json(PageView::Content { user_id })
}

async fn checkout(RequireSession(user_id): RequireSession) -> Json<PageView> {
    Json(PageView::Content { user_id })
}

async fn me<D: UserDirectory>(
    State(state): State<PageState<D>>,
    RequireSession(user_id): RequireSession,
) -> Result<Redirect, GateError> {
    let profile = state
        .directory
        .fetch_user(&user_id)
        .await
        .map_err(|e| GateError::Directory(e.to_string()))?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Session user has no profile");
            GateError::NotFound
        })?;

    Ok(Redirect::to(&profile.profile_path()))
}

// ── Tolerant pages ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NavBar {
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    links: Vec<NavLink>,
}

#[derive(Debug, Serialize)]
struct NavLink {
    label: &'static str,
    href: String,
}

async fn nav(State(config): State<GateConfig>, PeekSession(session): PeekSession) -> Json<NavBar> {
    let links = if session.is_authenticated() {
        vec![
            NavLink {
                label: "My page",
                href: "/me".into(),
            },
            NavLink {
                label: "Customize",
                href: "/customize".into(),
            },
        ]
    } else {
        vec![NavLink {
            label: "Log in",
            href: config.login_path().to_owned(),
        }]
    };

    Json(NavBar {
        logged_in: session.is_authenticated(),
        user_id: session.user_id().cloned(),
        links,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    username: String,
    viewer: SessionResult,
    attribution: AttributionRecord,
}

async fn profile(
    Path(username): Path<String>,
    PeekSession(viewer): PeekSession,
    Attribution(attribution): Attribution,
) -> Json<ProfileView> {
    Json(ProfileView {
        username,
        viewer,
        attribution,
    })
}
