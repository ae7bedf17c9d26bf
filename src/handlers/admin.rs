use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, NaiveDate, Utc};

use super::users::apply_profile_update;
use crate::{
    AppState,
    auth::AdminUser,
    error::{AppError, AppResult},
    models::{
        AdminDashboardStats, AgeStats, Gender, Role, RoleQuery, StatsSnapshot, UpdateUserRequest,
        User, UserProfile, UserStatus,
    },
};

/// Window used for the "new users" dashboard counter.
const NEW_USER_WINDOW_DAYS: i64 = 30;

async fn load_user(state: &AppState, id: i64) -> AppResult<User> {
    state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found with ID: {id}")))
}

/// list_users
///
/// [Admin Route] Every account, active or not.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All users", body = [UserProfile]))
)]
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_user(&state, id).await?.into()))
}

/// update_user_role
///
/// [Admin Route] Changes another account's role. Nobody can change their own role, and
/// only a SUPER_ADMIN may grant SUPER_ADMIN or touch an existing SUPER_ADMIN.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID"), RoleQuery),
    responses(
        (status = 200, description = "Role updated", body = UserProfile),
        (status = 400, description = "Attempt to change own role"),
        (status = 403, description = "Insufficient authority"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(RoleQuery { new_role }): Query<RoleQuery>,
) -> AppResult<Json<UserProfile>> {
    if admin.id == id {
        return Err(AppError::validation("You cannot change your own role"));
    }

    let mut user = load_user(&state, id).await?;
    let touches_super_admin = user.role == Role::SuperAdmin || new_role == Role::SuperAdmin;
    if touches_super_admin && !admin.role.has_authority(Role::SuperAdmin) {
        return Err(AppError::forbidden("Only a SUPER_ADMIN can manage SUPER_ADMIN accounts"));
    }

    let previous = user.role;
    user.role = new_role;
    let saved = state.repo.save_user(&user).await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = id,
        from = previous.as_str(),
        to = new_role.as_str(),
        "role changed"
    );
    Ok(Json(saved.into()))
}

/// toggle_user_status
///
/// [Admin Route] Flips an account between ACTIVE and INACTIVE. Inactive accounts cannot
/// log in and their outstanding tokens are refused.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/toggle-status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Status toggled", body = UserProfile),
        (status = 400, description = "Attempt to toggle own status"),
        (status = 403, description = "Target is a SUPER_ADMIN"),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_user_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    if admin.id == id {
        return Err(AppError::validation("You cannot change your own status"));
    }

    let mut user = load_user(&state, id).await?;
    if user.role == Role::SuperAdmin && !admin.role.has_authority(Role::SuperAdmin) {
        return Err(AppError::forbidden("Only a SUPER_ADMIN can manage SUPER_ADMIN accounts"));
    }

    user.status = match user.status {
        UserStatus::Active => UserStatus::Inactive,
        UserStatus::Inactive => UserStatus::Active,
    };
    let saved = state.repo.save_user(&user).await?;

    tracing::info!(admin_id = admin.id, user_id = id, status = ?saved.status, "status toggled");
    Ok(Json(saved.into()))
}

/// delete_user
///
/// [Admin Route] Soft delete: the account is marked INACTIVE and kept for history.
/// SUPER_ADMIN accounts cannot be deleted, and nobody can delete themselves here.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 400, description = "Attempt to delete own account"),
        (status = 403, description = "Target is a SUPER_ADMIN"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if admin.id == id {
        return Err(AppError::validation("You cannot delete your own account"));
    }

    let mut user = load_user(&state, id).await?;
    if user.role == Role::SuperAdmin {
        return Err(AppError::forbidden("SUPER_ADMIN accounts cannot be deleted"));
    }

    user.status = UserStatus::Inactive;
    state.repo.save_user(&user).await?;

    tracing::info!(admin_id = admin.id, user_id = id, "account deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 403, description = "Target is a SUPER_ADMIN"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<UserProfile>> {
    let updated = apply_profile_update(&state, &admin, id, req).await?;
    Ok(Json(updated.into()))
}

/// get_admin_stats
///
/// [Admin Route] Dashboard metrics: account counts by role and gender, recent sign-ups,
/// catalog totals, feedback volume, age range and price rankings.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<AdminDashboardStats>> {
    let now = Utc::now();
    let snapshot = state
        .repo
        .stats_snapshot(now - Duration::days(NEW_USER_WINDOW_DAYS))
        .await?;

    tracing::debug!(admin_id = admin.id, "dashboard stats requested");
    Ok(Json(build_dashboard(snapshot, now.date_naive())))
}

/// Derives the dashboard from raw aggregates. Every role and gender is listed, with 0
/// when no account matches.
pub fn build_dashboard(snapshot: StatsSnapshot, today: NaiveDate) -> AdminDashboardStats {
    let mut users_by_role: BTreeMap<String, i64> = [Role::User, Role::Admin, Role::SuperAdmin]
        .iter()
        .map(|r| (r.as_str().to_string(), 0))
        .collect();
    for (role, count) in snapshot.users_by_role {
        *users_by_role.entry(role.as_str().to_string()).or_default() += count;
    }

    let mut users_by_gender: BTreeMap<String, i64> = [Gender::Male, Gender::Female]
        .iter()
        .map(|g| (g.as_str().to_string(), 0))
        .collect();
    for (gender, count) in snapshot.users_by_gender {
        if let Some(gender) = gender {
            *users_by_gender.entry(gender.as_str().to_string()).or_default() += count;
        }
    }

    let ages: Vec<i32> = snapshot
        .birth_dates
        .iter()
        .filter_map(|birth| today.years_since(*birth))
        .map(|years| years as i32)
        .collect();

    AdminDashboardStats {
        total_users: snapshot.total_users,
        users_by_role,
        new_users_in_period: snapshot.new_users_since,
        total_fields: snapshot.total_fields,
        total_courses: snapshot.total_courses,
        total_certifications: snapshot.total_certifications,
        total_roadmaps: snapshot.total_roadmaps,
        total_evaluations: snapshot.total_evaluations,
        users_by_gender,
        age_stats: AgeStats {
            min_age: ages.iter().copied().min().unwrap_or(0),
            max_age: ages.iter().copied().max().unwrap_or(0),
        },
        most_expensive_courses: snapshot.most_expensive_courses,
        cheapest_courses: snapshot.cheapest_courses,
        most_expensive_certifications: snapshot.most_expensive_certifications,
        cheapest_certifications: snapshot.cheapest_certifications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dashboard_lists_every_role_and_gender() {
        let snapshot = StatsSnapshot {
            total_users: 3,
            users_by_role: vec![(Role::User, 2), (Role::SuperAdmin, 1)],
            users_by_gender: vec![(Some(Gender::Female), 1), (None, 2)],
            ..Default::default()
        };
        let stats = build_dashboard(snapshot, date(2024, 6, 1));

        assert_eq!(stats.users_by_role["USER"], 2);
        assert_eq!(stats.users_by_role["ADMIN"], 0);
        assert_eq!(stats.users_by_role["SUPER_ADMIN"], 1);
        assert_eq!(stats.users_by_gender["FEMALE"], 1);
        assert_eq!(stats.users_by_gender["MALE"], 0);
        assert_eq!(stats.age_stats, AgeStats { min_age: 0, max_age: 0 });
    }

    #[test]
    fn ages_count_completed_years() {
        let snapshot = StatsSnapshot {
            birth_dates: vec![date(2000, 6, 2), date(1990, 1, 1)],
            ..Default::default()
        };
        let stats = build_dashboard(snapshot, date(2024, 6, 1));

        assert_eq!(stats.age_stats, AgeStats { min_age: 23, max_age: 34 });
    }
}
