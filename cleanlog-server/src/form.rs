//! Form field handling at the API boundary
//!
//! Cleaner apps post booleans as strings and may send either JSON or a
//! URL-encoded body. Both conversions live here so every endpoint treats
//! input the same way.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use cleanlog_common::db::{NewCleaningRecord, DEFAULT_CLEANING_REQUEST};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Interpret a string-typed form boolean.
///
/// Only the exact literal `"true"` is true. `"false"`, `"1"`, `"TRUE"`,
/// the empty string and an absent field are all false.
pub fn parse_form_bool(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Text fields of a cleaning submission, keyed by their camelCase names
#[derive(Debug, Default, Clone)]
pub struct CleaningFields(HashMap<String, String>);

impl CleaningFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// Build the record to insert; uploaded paths are supplied separately
    pub fn into_new_record(self, photos: Vec<String>, problem_photo: Option<String>) -> NewCleaningRecord {
        let cleaning_request = match self.get("cleaningRequest") {
            Some(request) if !request.is_empty() => request.to_string(),
            _ => DEFAULT_CLEANING_REQUEST.to_string(),
        };

        NewCleaningRecord {
            cleaner_name: self.text("cleanerName"),
            block: self.text("block"),
            apartment_number: self.text("apartmentNumber"),
            status: self.text("status"),
            notes: self.text("notes"),
            cleaning_date: self.text("cleaningDate"),
            cleaning_time: self.text("cleaningTime"),
            tenant_not_home: parse_form_bool(self.get("tenantNotHome")),
            tenant_signed: parse_form_bool(self.get("tenantSigned")),
            tenant_signature: self.text("tenantSignature"),
            cleaning_request,
            photos,
            has_problem: parse_form_bool(self.get("hasProblem")),
            problem_note: self.text("problemNote"),
            problem_photo,
        }
    }
}

/// Body extractor accepting `application/json` or
/// `application/x-www-form-urlencoded`.
///
/// A request with neither content type (including an empty body) yields
/// `T::default()` so handlers can report missing fields themselves.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.status(), e.body_text()))?;
            Ok(FormOrJson(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.status(), e.body_text()))?;
            Ok(FormOrJson(value))
        } else {
            Ok(FormOrJson(T::default()))
        }
    }
}
