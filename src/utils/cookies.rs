//! Session cookies: `accessToken` and `refreshToken`, both http-only,
//! SameSite=Strict, path `/`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use kurs_config::JwtConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

pub fn with_access_token(jar: CookieJar, token: String, config: &JwtConfig) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        token,
        config.access_token_expiry,
        config.secure_cookies,
    ))
}

pub fn with_session(
    jar: CookieJar,
    access_token: String,
    refresh_token: String,
    config: &JwtConfig,
) -> CookieJar {
    with_access_token(jar, access_token, config).add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token,
        config.refresh_token_expiry,
        config.secure_cookies,
    ))
}

pub fn clear_access_token(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    clear_access_token(jar).remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}
