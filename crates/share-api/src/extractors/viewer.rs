//! Viewer identity signals
//!
//! Collects everything the identity resolver may use: the verified
//! principal, a session identifier, proxy headers, and the socket peer.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use share_core::identity::RequestSignals;

use super::auth::OptionalAuthUser;
use crate::response::ApiError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "session_id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Identity signals of the current request
#[derive(Debug, Clone, Default)]
pub struct ViewerSignals(pub RequestSignals);

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    header_value(headers, SESSION_HEADER).or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().trim().to_owned())
            .filter(|v| !v.is_empty())
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for ViewerSignals
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = OptionalAuthUser::from_request_parts(parts, state)
            .await?
            .user_id();

        let headers = &parts.headers;
        let peer_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(RequestSignals {
            principal,
            session_id: session_id(headers),
            forwarded_for: header_value(headers, FORWARDED_FOR_HEADER),
            real_ip: header_value(headers, REAL_IP_HEADER),
            peer_addr,
        }))
    }
}
