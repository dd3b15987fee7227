//! Token cookies.
//!
//! Tokens are issued by the API and stored in the browser as `HttpOnly`
//! cookies. The server never inspects them; it only forwards them as bearer
//! tokens.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{AppError, AppState, call_api};

/// Cookie holding the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie holding the long-lived refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn token_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Adds an access token cookie to the jar.
pub fn with_access_token(state: &AppState, jar: CookieJar, token: String) -> CookieJar {
    let settings = &state.settings;
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        token,
        settings.access_token_max_age_secs,
        settings.secure_cookies,
    ))
}

/// Adds a refresh token cookie to the jar.
pub fn with_refresh_token(state: &AppState, jar: CookieJar, token: String) -> CookieJar {
    let settings = &state.settings;
    jar.add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        token,
        settings.refresh_token_max_age_secs,
        settings.secure_cookies,
    ))
}

/// Removes both token cookies.
pub fn without_tokens(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

/// Returns the value of a cookie, ignoring empty values.
pub fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Returns an access token for the request, refreshing it from the refresh
/// token cookie if necessary.
///
/// The returned jar contains the new access token cookie, if there is one,
/// and must be sent back with the response.
pub async fn authenticate(
    state: &Arc<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, String), AppError> {
    if let Some(access_token) = cookie_value(&jar, ACCESS_TOKEN_COOKIE) {
        return Ok((jar, access_token));
    }

    let refresh_token = cookie_value(&jar, REFRESH_TOKEN_COOKIE).ok_or(AppError::Unauthorized)?;
    log::debug!("access token missing; refreshing");
    let access_token = call_api(state, move |api| api.refresh(&refresh_token))
        .await
        .map_err(|e| match e {
            cubechrono_api_client::Error::Api { .. } => AppError::Unauthorized,
            other => AppError::from(other),
        })?;
    let jar = with_access_token(state, jar, access_token.clone());
    Ok((jar, access_token))
}
