// src/extract.rs
//! Request extractors that reject with [`AppError`] so malformed input is
//! reported with the same JSON body as every other failure.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::{AppError, FieldError};
use crate::pagination::{PageRequest, Sort};
use crate::state::AppState;

/// Body types that carry shape constraints of their own.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// JSON body that has been parsed and validated before the handler runs.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(AppError::invalid_fields)?;
        Ok(ValidJson(value))
    }
}

/// Path parameters, rejected with a JSON 400 when they do not parse.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(PathParam(value))
    }
}

/// `?page=&size=&sort=` resolved against the configured page size limits.
///
/// `sort` may be repeated; each value is `property[,property...][,asc|desc]`
/// and the orders are applied in the order the parameters appear.
#[derive(Debug)]
pub struct Pageable(pub PageRequest);

impl FromRequestParts<AppState> for Pageable {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let paging = state.paging;
        let mut page = 0;
        let mut size = paging.default_size;
        let mut sort = Sort::unsorted();
        let mut errors = Vec::new();

        let query = parts.uri.query().unwrap_or_default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "page" => match value.parse::<u32>() {
                    Ok(parsed) => page = parsed,
                    Err(_) => errors.push(FieldError::new("page", format!("Invalid page index {value:?}"))),
                },
                "size" => match value.parse::<u32>() {
                    Ok(parsed) => size = parsed,
                    Err(_) => errors.push(FieldError::new("size", format!("Invalid page size {value:?}"))),
                },
                "sort" if value.is_empty() => {}
                "sort" => match value.parse::<Sort>() {
                    Ok(parsed) => sort = sort.then(parsed),
                    Err(e) => errors.push(FieldError::new("sort", e.to_string())),
                },
                _ => {}
            }
        }

        if !errors.is_empty() {
            return Err(AppError::invalid_fields(errors));
        }

        let request = PageRequest::new(page, size.min(paging.max_size), sort)
            .map_err(|e| AppError::invalid_fields(vec![FieldError::new("size", e.to_string())]))?;

        Ok(Pageable(request))
    }
}
