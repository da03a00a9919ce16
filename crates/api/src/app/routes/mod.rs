use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use backoffice_auth::{GuardChain, GuardPolicy, Role, RoleSet};

use crate::middleware::{self, AuthState};

pub mod auth;
pub mod common;
pub mod interservice;
pub mod system;
pub mod users;

/// Allowed roles of each protected route group.
pub mod policies {
    use super::*;

    pub fn super_admin() -> GuardPolicy {
        GuardPolicy::new(RoleSet::single(Role::SuperAdmin))
    }

    pub fn admins() -> GuardPolicy {
        GuardPolicy::new(RoleSet::new(Role::Admin, [Role::SuperAdmin]))
    }

    pub fn password_change() -> GuardPolicy {
        GuardPolicy::password_change(RoleSet::new(Role::Admin, [Role::SuperAdmin]))
    }

    /// Peer services; candidates are tried in this order.
    pub fn peer_services() -> GuardPolicy {
        GuardPolicy::new(RoleSet::new(
            Role::Client,
            [Role::Restaurateur, Role::Deliverer],
        ))
    }

    pub fn all() -> [(&'static str, GuardPolicy); 4] {
        [
            ("super-admin routes", super_admin()),
            ("admin routes", admins()),
            ("password change", password_change()),
            ("interservice routes", peer_services()),
        ]
    }
}

fn guarded(router: Router, guard: &Arc<GuardChain>, policy: GuardPolicy) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(
        AuthState::new(guard.clone(), policy),
        middleware::auth_middleware,
    ))
}

/// Router for all protected endpoints, one guard per route group.
pub fn router(guard: &Arc<GuardChain>) -> Router {
    let super_admin = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id/suspend", patch(users::suspend_user))
        .route("/users/:id/restore", patch(users::restore_user));

    let admins = Router::new()
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/verify/:id", get(users::verify_user))
        .route("/auth/me", get(auth::me));

    let password = Router::new().route("/auth/password", post(auth::change_password));

    let peers = Router::new().route("/interservice/whoami", get(interservice::whoami));

    Router::new()
        .merge(guarded(super_admin, guard, policies::super_admin()))
        .merge(guarded(admins, guard, policies::admins()))
        .merge(guarded(password, guard, policies::password_change()))
        .merge(guarded(peers, guard, policies::peer_services()))
}
