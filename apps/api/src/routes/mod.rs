pub mod health;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::auth::middleware::require_auth;
use crate::churches::handlers as churches;
use crate::interests::handlers as interests;
use crate::invites::handlers as invites;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::registration::handlers as registration;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    // Everything below requires a bearer token.
    let protected = Router::new()
        // Churches
        .route("/api/churches/create", post(churches::handle_create_church))
        // Users
        .route("/api/users/create", post(users::handle_create_user))
        .route("/api/user/me", get(users::handle_user_me))
        .route("/api/reset-password", post(auth::handle_reset_password))
        // Invite codes
        .route(
            "/api/invite-codes/create",
            post(invites::handle_create_invite_code),
        )
        .route("/api/invite-codes", get(invites::handle_list_invite_codes))
        // Profiles
        .route(
            "/api/profile/me",
            get(profiles::handle_profile_me)
                .put(profiles::handle_update_profile_me)
                .patch(profiles::handle_update_profile_me),
        )
        .route("/api/profile/reset", post(profiles::handle_reset_profile))
        .route("/api/profiles", get(profiles::handle_list_profiles))
        .route(
            "/api/profiles/:id/review",
            patch(profiles::handle_review_profile),
        )
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        // Mutual interests
        .route(
            "/api/mutual-interests",
            get(interests::handle_list_interests).post(interests::handle_create_interest),
        )
        .route(
            "/api/mutual-interests/:id",
            delete(interests::handle_delete_interest),
        )
        .route(
            "/api/mutual-interests/matches",
            get(interests::handle_matches),
        )
        .route(
            "/api/mutual-interests/admin-matches",
            get(interests::handle_admin_matches),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Token endpoints and invite-gated registration stay public.
        .route("/api/token", post(auth::handle_login))
        .route("/api/token/refresh", post(auth::handle_refresh))
        .route(
            "/api/candidates/register",
            post(registration::handle_register_candidate),
        )
        .route(
            "/api/applicants/register",
            post(registration::handle_register_applicant),
        )
        .merge(protected)
        .with_state(state)
}
