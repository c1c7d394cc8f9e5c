use std::{convert::Infallible, sync::Arc};

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use warp::{
    http::header::{CONTENT_TYPE, SET_COOKIE},
    hyper::{Response, StatusCode},
    path, Filter, Rejection, Reply,
};

use crate::{
    cookie::{SetCookie, ALIAS_COOKIE, HASH_COOKIE},
    error::GuestAliasError,
    guest::{GuestAlias, GuestAliasInternal},
    types::{
        Alias, AliasAvailabilityResponse, AliasResponse, CheckAliasQuery, SetAliasRequest,
        SuccessResponse,
    },
};

pub fn build_api_route_filter(
    guest: &GuestAlias,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let set_custom = path!("guest" / "alias")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_guest_state(guest.internal.clone()))
        .and_then(set_custom_alias);

    let set_random = path!("guest" / "alias" / "random")
        .and(warp::post())
        .and(with_guest_state(guest.internal.clone()))
        .and_then(set_random_alias);

    let current = path!("guest" / "alias")
        .and(warp::get())
        .and(with_guest_alias(guest))
        .and(with_guest_state(guest.internal.clone()))
        .and_then(current_alias);

    let wipe = path!("guest" / "alias")
        .and(warp::delete())
        .and(with_guest_state(guest.internal.clone()))
        .and_then(wipe_alias);

    let check = path!("alias" / "check")
        .and(warp::get())
        .and(warp::query::<CheckAliasQuery>())
        .and(with_guest_state(guest.internal.clone()))
        .and_then(check_alias);

    set_custom.or(set_random).or(current).or(wipe).or(check)
}

/// Extracts the guest alias carried by the request's cookies, if any.
/// Never rejects: missing, corrupted and forged cookies all yield `None`.
pub fn with_guest_alias(
    guest: &GuestAlias,
) -> impl Filter<Extract = (Option<Alias>,), Error = Infallible> + Clone {
    warp::cookie::optional(ALIAS_COOKIE)
        .and(warp::cookie::optional(HASH_COOKIE))
        .and(with_guest_state(guest.internal.clone()))
        .map(
            |value: Option<String>, tag: Option<String>, guest: Arc<GuestAliasInternal>| {
                guest.resolve(value.as_deref(), tag.as_deref())
            },
        )
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn handle_guest_alias_errors(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(guest_error) = err.find::<GuestAliasError>() {
        let (status, message) = match guest_error {
            GuestAliasError::InvalidAlias { .. } => {
                (StatusCode::BAD_REQUEST, guest_error.to_string())
            }
            GuestAliasError::AliasTaken(_) => (StatusCode::CONFLICT, guest_error.to_string()),
            GuestAliasError::RegistryError { source } => {
                warn!(error = %source, "alias registry lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unknown error has occurred".to_string(),
                )
            }
        };
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorResponse { error: message }),
            status,
        ));
    }

    Err(err)
}

async fn set_custom_alias(
    input: SetAliasRequest,
    guest: Arc<GuestAliasInternal>,
) -> Result<impl Reply, Rejection> {
    let alias = Alias::normalize(&input.alias).map_err(GuestAliasError::from)?;

    if !guest.is_available(&alias).await? {
        Err(GuestAliasError::AliasTaken(alias.clone()))?;
    }

    info!(%alias, "issuing custom guest alias");

    Ok(issued_response(&guest, &alias))
}

async fn set_random_alias(guest: Arc<GuestAliasInternal>) -> Result<impl Reply, Rejection> {
    let alias = Alias::generate();

    info!(%alias, "issuing random guest alias");

    Ok(issued_response(&guest, &alias))
}

async fn current_alias(
    alias: Option<Alias>,
    guest: Arc<GuestAliasInternal>,
) -> Result<impl Reply, Rejection> {
    let address = alias.as_ref().map(|alias| alias.address(guest.domain()));

    Ok(warp::reply::json(&AliasResponse { alias, address }))
}

async fn wipe_alias(guest: Arc<GuestAliasInternal>) -> Result<impl Reply, Rejection> {
    info!("wiping guest alias");

    Ok(with_cookies(
        guest.wipe(),
        json!(SuccessResponse { success: true }).to_string(),
    ))
}

async fn check_alias(
    query: CheckAliasQuery,
    guest: Arc<GuestAliasInternal>,
) -> Result<impl Reply, Rejection> {
    let alias = Alias::normalize(&query.alias).map_err(GuestAliasError::from)?;
    let available = guest.is_available(&alias).await?;

    Ok(warp::reply::json(&AliasAvailabilityResponse { alias, available }))
}

fn issued_response(
    guest: &GuestAliasInternal,
    alias: &Alias,
) -> Result<Response<String>, warp::http::Error> {
    let body = json!(AliasResponse {
        alias: Some(alias.clone()),
        address: Some(alias.address(guest.domain())),
    })
    .to_string();

    with_cookies(guest.persist(alias), body)
}

fn with_cookies(
    cookies: [SetCookie; 2],
    body: String,
) -> Result<Response<String>, warp::http::Error> {
    let [value, tag] = cookies;

    Response::builder()
        .header(CONTENT_TYPE, "application/json")
        .header(SET_COOKIE, value.to_string())
        .header(SET_COOKIE, tag.to_string())
        .body(body)
}

// functor that adds a reference to the shared guest alias state into the filter chain
fn with_guest_state(
    guest: Arc<GuestAliasInternal>,
) -> impl Filter<Extract = (Arc<GuestAliasInternal>,), Error = Infallible> + Clone {
    warp::any().map(move || guest.clone())
}
