//! HTTP client for the EHReezy REST API.
//!
//! This module is the only place that talks to the network. It wraps a
//! blocking `reqwest` client, injects the bearer token and the standard
//! headers on every request, and maps response statuses into the
//! [`ApiError`] taxonomy. Components call these functions directly and
//! surface failures as on-screen status messages; a 401 anywhere is
//! escalated so the application can clear the session and return to the
//! login screen.
//!
//! There are no retries, no circuit breaking and no offline queueing.

use crate::config::ApiConfig;
use crate::models::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by API calls.
///
/// `Unauthorized` is the one centrally handled class: every caller
/// forwards it upward so the session gets cleared. `Validation` carries
/// the server's per-field 422 payload so forms can merge it into their
/// inline error display.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    #[error("{message}")]
    Validation {
        message: String,
        errors: HashMap<String, Vec<String>>,
    },

    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shape the server uses for 4xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: HashMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub business_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

/// What `/auth/login` and `/auth/register` return.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub business: Option<Business>,
    #[serde(default)]
    pub pharmacy: Option<PharmacyInfo>,
}

/// Thin client over the EHReezy API. Cheap to clone: the underlying
/// `reqwest` client is reference-counted and the token cell is shared,
/// so a clone handed to a background fetch thread sees token updates.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, token: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.clone(),
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// Installs the bearer token after a successful login/registration.
    pub fn set_token(&self, token: String) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    /// Drops the bearer token (logout, or after a 401).
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::blocking::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = self.token.read().ok().and_then(|g| g.clone()) {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends the request and maps the response status into `ApiError`.
    /// Every call funnels through here so 401 and 422 handling stays in
    /// one place.
    fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: reqwest::blocking::RequestBuilder,
    ) -> ApiResult<T> {
        let response = builder.send().map_err(|e| {
            warn!(path, error = %e, "request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!(path, "unauthorized response, session will be cleared");
            return Err(ApiError::Unauthorized);
        }
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let body: ErrorBody = response.json().unwrap_or(ErrorBody {
                message: None,
                errors: HashMap::new(),
            });
            return Err(ApiError::Validation {
                message: body
                    .message
                    .unwrap_or_else(|| "The given data was invalid.".to_string()),
                errors: body.errors,
            });
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(path, status = status.as_u16(), %message, "API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json().map_err(ApiError::Network)
    }

    /// Like `send`, for endpoints whose success body is empty or ignored.
    fn send_no_body(
        &self,
        path: &str,
        builder: reqwest::blocking::RequestBuilder,
    ) -> ApiResult<()> {
        // Drain into a throwaway value map so empty bodies also pass.
        match self.send::<serde_json::Value>(path, builder) {
            Ok(_) => Ok(()),
            Err(ApiError::Network(e)) if e.is_decode() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(path, self.request(reqwest::Method::GET, path))
    }

    fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(path, self.request(reqwest::Method::POST, path).json(body))
    }

    fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(path, self.request(reqwest::Method::PUT, path).json(body))
    }

    // ---- Auth ----------------------------------------------------------

    /// `POST /auth/login`. On success the returned token is installed on
    /// this client; persisting it is the caller's job.
    pub fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let auth: AuthResponse =
            self.post("/auth/login", &LoginRequest { email, password })?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    /// `POST /auth/register`. Registers a new practice account and logs
    /// straight in.
    pub fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let auth: AuthResponse = self.post("/auth/register", request)?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    /// `POST /auth/logout`. Best-effort server-side token revocation; the
    /// local session is cleared regardless of the outcome.
    pub fn logout(&self) -> ApiResult<()> {
        let result =
            self.send_no_body("/auth/logout", self.request(reqwest::Method::POST, "/auth/logout"));
        self.clear_token();
        result
    }

    /// `GET /auth/me` — refreshes the cached user profile.
    pub fn me(&self) -> ApiResult<User> {
        self.get("/auth/me")
    }

    /// `PUT /auth/me` — profile update.
    pub fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        self.put("/auth/me", update)
    }

    // ---- Patients ------------------------------------------------------

    pub fn list_patients(&self) -> ApiResult<Vec<Patient>> {
        self.get("/patients")
    }

    pub fn create_patient(&self, patient: &NewPatient) -> ApiResult<Patient> {
        self.post("/patients", patient)
    }

    // ---- Patient invitations -------------------------------------------

    pub fn list_invitations(&self) -> ApiResult<Vec<Invitation>> {
        self.get("/patient-invitations")
    }

    pub fn send_invitation(&self, email: &str) -> ApiResult<Invitation> {
        self.post(
            "/patient-invitations",
            &serde_json::json!({ "email": email }),
        )
    }

    pub fn resend_invitation(&self, id: u64) -> ApiResult<Invitation> {
        let path = format!("/patient-invitations/{id}/resend");
        self.send(&path, self.request(reqwest::Method::POST, &path))
    }

    pub fn cancel_invitation(&self, id: u64) -> ApiResult<Invitation> {
        let path = format!("/patient-invitations/{id}/cancel");
        self.send(&path, self.request(reqwest::Method::POST, &path))
    }

    // ---- Staff ---------------------------------------------------------

    pub fn list_staff(&self) -> ApiResult<Vec<StaffMember>> {
        self.get("/staff")
    }

    pub fn create_staff(&self, member: &NewStaffMember) -> ApiResult<StaffMember> {
        self.post("/staff", member)
    }

    // ---- Appointments --------------------------------------------------

    /// `GET /appointments?from=..&to=..` — everything in a visible
    /// calendar range, or a plain list when no range is given.
    pub fn list_appointments(
        &self,
        range: Option<(time::Date, time::Date)>,
    ) -> ApiResult<Vec<Appointment>> {
        let path = "/appointments";
        let mut builder = self.request(reqwest::Method::GET, path);
        if let Some((from, to)) = range {
            builder = builder.query(&[("from", from.to_string()), ("to", to.to_string())]);
        }
        self.send(path, builder)
    }

    pub fn create_appointment(&self, request: &AppointmentRequest) -> ApiResult<Appointment> {
        self.post("/appointments", request)
    }

    pub fn update_appointment(
        &self,
        id: u64,
        request: &AppointmentRequest,
    ) -> ApiResult<Appointment> {
        self.put(&format!("/appointments/{id}"), request)
    }

    /// `PATCH /appointments/{id}/status` — the client requests a status
    /// transition; whether it is legal is the server's call.
    pub fn set_appointment_status(
        &self,
        id: u64,
        status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        let path = format!("/appointments/{id}/status");
        self.send(
            &path,
            self.request(reqwest::Method::PATCH, &path)
                .json(&serde_json::json!({ "status": status })),
        )
    }

    pub fn delete_appointment(&self, id: u64) -> ApiResult<()> {
        let path = format!("/appointments/{id}");
        self.send_no_body(&path, self.request(reqwest::Method::DELETE, &path))
    }

    /// `GET /appointments/availability/check` — open slots for one
    /// provider, date and duration. The backend computes availability;
    /// this client only displays it.
    pub fn check_availability(&self, query: &AvailabilityQuery) -> ApiResult<Vec<AvailabilitySlot>> {
        let path = "/appointments/availability/check";
        self.send(path, self.request(reqwest::Method::GET, path).query(query))
    }

    // ---- Medical records -----------------------------------------------

    pub fn list_visits(&self, patient_id: u64) -> ApiResult<Vec<Visit>> {
        self.get(&format!("/patients/{patient_id}/visits"))
    }

    pub fn create_visit(&self, visit: &NewVisit) -> ApiResult<Visit> {
        self.post(&format!("/patients/{}/visits", visit.patient_id), visit)
    }

    pub fn list_lab_results(&self, patient_id: u64) -> ApiResult<Vec<LabResult>> {
        self.get(&format!("/patients/{patient_id}/lab-results"))
    }

    pub fn list_prescriptions(&self, patient_id: u64) -> ApiResult<Vec<Prescription>> {
        self.get(&format!("/patients/{patient_id}/prescriptions"))
    }

    pub fn list_documents(&self, patient_id: u64) -> ApiResult<Vec<Document>> {
        self.get(&format!("/patients/{patient_id}/documents"))
    }

    // ---- Billing -------------------------------------------------------

    pub fn list_invoices(&self) -> ApiResult<Vec<Invoice>> {
        self.get("/invoices")
    }

    pub fn record_payment(&self, invoice_id: u64, amount: f64) -> ApiResult<Invoice> {
        self.post(
            &format!("/invoices/{invoice_id}/payments"),
            &serde_json::json!({ "amount": amount }),
        )
    }

    // ---- Messaging -----------------------------------------------------

    pub fn list_threads(&self) -> ApiResult<Vec<MessageThread>> {
        self.get("/messages")
    }

    pub fn list_messages(&self, thread_id: u64) -> ApiResult<Vec<Message>> {
        self.get(&format!("/messages/{thread_id}"))
    }

    pub fn send_message(&self, thread_id: u64, body: &str) -> ApiResult<Message> {
        self.post(
            &format!("/messages/{thread_id}"),
            &serde_json::json!({ "body": body }),
        )
    }

    // ---- Telehealth ----------------------------------------------------

    pub fn list_telehealth_sessions(&self) -> ApiResult<Vec<TelehealthSession>> {
        self.get("/telehealth/sessions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_per_field_messages() {
        let mut errors = HashMap::new();
        errors.insert(
            "start_time".to_string(),
            vec!["The selected time is no longer available.".to_string()],
        );
        let err = ApiError::Validation {
            message: "The given data was invalid.".to_string(),
            errors,
        };
        assert!(!err.is_unauthorized());
        let ApiError::Validation { errors, .. } = &err else {
            panic!("expected a validation error");
        };
        assert_eq!(errors["start_time"].len(), 1);
        assert_eq!(err.to_string(), "The given data was invalid.");
    }

    #[test]
    fn error_body_tolerates_missing_fields() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
        assert!(body.errors.is_empty());
    }
}
