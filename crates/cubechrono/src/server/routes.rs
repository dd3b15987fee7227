use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;
use cubechrono_api_client::{AccountInfo, AddTime, AuthTokens, Credentials, NewSession};
use cubechrono_core::{ScrambleBatch, ScrambleRequest};
use serde_json::{Value, json};

use super::auth::{self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::{AppError, AppState, call_api};

type ApiResult<T = Json<Value>> = Result<T, AppError>;

fn check_scramble_count(state: &AppState, request: &ScrambleRequest) -> ApiResult<()> {
    let max = state.settings.max_scramble_count;
    if request.count > max {
        return Err(AppError::BadRequest(format!(
            "count must be at most {max}, got {}",
            request.count
        )));
    }
    Ok(())
}

fn scrambles_response(batch: &ScrambleBatch) -> Json<Value> {
    Json(json!({
        "message": format!("Generated {} scrambles", batch.len()),
        "payload": {
            "scrambles": batch.scrambles,
        },
    }))
}

/// `GET /api/v1/scrambles?kind=Three&count=1[&seed=N]`
///
/// Generates scrambles locally. Each request gets its own RNG.
pub async fn generate_scrambles(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(request), _): WithRejection<Query<ScrambleRequest>, AppError>,
) -> ApiResult {
    check_scramble_count(&state, &request)?;
    let batch = request.generate()?;
    Ok(scrambles_response(&batch))
}

/// `POST /scrambles` with `{"kind": ..., "count": ...}`
///
/// Asks the API for scrambles, falling back to local generation.
pub async fn proxy_scrambles(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<ScrambleRequest>, AppError>,
) -> ApiResult {
    check_scramble_count(&state, &request)?;
    let batch = call_api(&state, move |api| api.scrambles_or_local(&request))
        .await
        .map_err(|e| AppError::from_api(e, "Error while generating scrambles"))?;
    Ok(scrambles_response(&batch))
}

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> ApiResult {
    let Some(access_token) = auth::cookie_value(&jar, ACCESS_TOKEN_COOKIE) else {
        return Ok(Json(json!({ "is_logged_in": false, "is_admin": false })));
    };
    let account = match call_api(&state, move |api| api.profile(&access_token)).await {
        Ok(profile) => AccountInfo::from_response(&profile),
        Err(e) => {
            log::debug!("not logged in: {e}");
            None
        }
    };
    Ok(Json(json!({
        "is_logged_in": account.is_some(),
        "is_admin": account.as_ref().is_some_and(AccountInfo::is_admin),
        "username": account.map(|a| a.username),
    })))
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(credentials), _): WithRejection<Json<Credentials>, AppError>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let response = call_api(&state, move |api| api.login(&credentials))
        .await
        .map_err(|e| AppError::from_api(e, "Error while logging in"))?;
    let tokens = AuthTokens::from_response(&response)
        .ok_or_else(|| AppError::Internal("login response is missing tokens".to_owned()))?;

    let jar = auth::with_access_token(&state, jar, tokens.access_token);
    let jar = auth::with_refresh_token(&state, jar, tokens.refresh_token);
    Ok((jar, Json(response)))
}

/// `POST /register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(credentials), _): WithRejection<Json<Credentials>, AppError>,
) -> ApiResult {
    call_api(&state, move |api| api.register(&credentials))
        .await
        .map(Json)
        .map_err(|e| AppError::from_api(e, "Error while registering"))
}

/// `POST /logout`
///
/// Always clears the cookies, even if the API could not revoke the token.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(refresh_token) = auth::cookie_value(&jar, REFRESH_TOKEN_COOKIE)
        && let Err(e) = call_api(&state, move |api| api.logout(&refresh_token)).await
    {
        log::warn!("error revoking refresh token: {e}");
    }
    (auth::without_tokens(jar), Redirect::to("/"))
}

/// `POST /new-session` with `{"name": ...}`
pub async fn new_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(session), _): WithRejection<Json<NewSession>, AppError>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (jar, token) = auth::authenticate(&state, jar).await?;
    let response = call_api(&state, move |api| api.create_empty_session(&token, &session))
        .await
        .map_err(|e| AppError::from_api(e, "Error while creating the session"))?;
    Ok((jar, Json(response)))
}

/// `POST /add-time` with `{"session_id": ..., "time": {...}}`
pub async fn add_time(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(add_time), _): WithRejection<Json<AddTime>, AppError>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (jar, token) = auth::authenticate(&state, jar).await?;
    let response = call_api(&state, move |api| api.add_time(&token, &add_time))
        .await
        .map_err(|e| AppError::from_api(e, "Error while saving the time"))?;
    Ok((jar, Json(response)))
}

/// `GET /sessions`
pub async fn sessions(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (jar, token) = auth::authenticate(&state, jar).await?;
    let response = call_api(&state, move |api| api.sessions(&token))
        .await
        .map_err(|e| AppError::from_api(e, "Error while fetching sessions"))?;
    Ok((jar, Json(response)))
}

/// `GET /session/{id}`
pub async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (jar, token) = auth::authenticate(&state, jar).await?;
    let response = call_api(&state, move |api| api.session(&token, &id))
        .await
        .map_err(|e| AppError::from_api(e, "Session not found"))?;
    Ok((jar, Json(response)))
}

/// `GET /myprofile`
pub async fn my_profile(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (jar, token) = auth::authenticate(&state, jar).await?;
    let response = call_api(&state, move |api| api.profile(&token))
        .await
        .map_err(|e| AppError::from_api(e, "Error while fetching the profile"))?;
    Ok((jar, Json(response)))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
