//! Wire models for the EHReezy API.
//!
//! Every type here is a plain record received from or sent to the remote
//! API. The client holds no authoritative state: status enums mirror the
//! server's snake_case strings, and action affordances (`can_cancel`,
//! `can_complete`) are server-supplied flags the UI obeys without
//! recomputing eligibility.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// Roles the backend assigns to a user account. Drives navigation
/// visibility and route gating, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Therapist,
    Receptionist,
    Patient,
    Pharmacy,
}

impl Role {
    /// Staff roles get the full clinic suite; patients and pharmacies get
    /// restricted portals.
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::Doctor | Role::Nurse | Role::Therapist | Role::Receptionist
        )
    }

    /// Staff roles that can be booked against an appointment.
    pub fn is_provider(&self) -> bool {
        matches!(self, Role::Doctor | Role::Nurse | Role::Therapist)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Doctor => write!(f, "Doctor"),
            Role::Nurse => write!(f, "Nurse"),
            Role::Therapist => write!(f, "Therapist"),
            Role::Receptionist => write!(f, "Receptionist"),
            Role::Patient => write!(f, "Patient"),
            Role::Pharmacy => write!(f, "Pharmacy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The tenant (practice/clinic) the logged-in staff user belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: u64,
    pub name: String,
}

/// Pharmacy context attached to pharmacy-role logins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<Date>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for the "create new patient" flow. Dates stay as the raw form
/// text; the server validates the format.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewStaffMember {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Confirmed => write!(f, "Confirmed"),
            AppointmentStatus::InProgress => write!(f, "In Progress"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::NoShow => write!(f, "No Show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    InPerson,
    Telehealth,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::InPerson => write!(f, "In-person"),
            AppointmentType::Telehealth => write!(f, "Telehealth"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub patient_id: u64,
    pub patient_name: String,
    pub staff_id: u64,
    pub staff_name: String,
    pub appointment_date: Date,
    /// "HH:MM", as the server sends it.
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub reason_for_visit: String,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub reminder_enabled: bool,
    /// Server-computed affordances; the client shows or hides the
    /// matching actions and never derives eligibility itself.
    #[serde(default)]
    pub can_cancel: bool,
    #[serde(default)]
    pub can_complete: bool,
}

/// Appointment create/update payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentRequest {
    pub patient_id: Option<u64>,
    pub staff_id: Option<u64>,
    pub appointment_date: Option<Date>,
    pub start_time: String,
    pub duration_minutes: u32,
    pub appointment_type: Option<AppointmentType>,
    pub reason_for_visit: String,
    pub fee: Option<f64>,
    pub reminder_enabled: bool,
}

/// A discrete bookable interval for a provider on one date, computed by
/// the backend and merely displayed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub start_time: String,
    pub end_time: String,
}

/// Parameters for `/appointments/availability/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityQuery {
    pub staff_id: u64,
    pub date: Date,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: u64,
    pub patient_id: u64,
    pub visit_date: Date,
    pub provider_name: String,
    pub chief_complaint: String,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub vitals: Option<VitalSigns>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVisit {
    pub patient_id: u64,
    pub visit_date: Date,
    pub chief_complaint: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub vitals: Option<VitalSigns>,
}

/// One vital-sign reading. All fields optional: clinics record what they
/// measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default)]
    pub systolic_bp: Option<u16>,
    #[serde(default)]
    pub diastolic_bp: Option<u16>,
    #[serde(default)]
    pub heart_rate: Option<u16>,
    /// Degrees Fahrenheit.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Pounds.
    #[serde(default)]
    pub weight_lbs: Option<f64>,
    /// Inches.
    #[serde(default)]
    pub height_inches: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub id: u64,
    pub patient_id: u64,
    pub test_name: String,
    pub result_value: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    pub collected_on: Date,
    #[serde(default)]
    pub flagged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: u64,
    pub patient_id: u64,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub prescribed_by: String,
    pub start_date: Date,
    #[serde(default)]
    pub refills_remaining: u8,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub patient_id: u64,
    pub title: String,
    pub file_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub uploaded_on: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "Pending"),
            InvoiceStatus::Paid => write!(f, "Paid"),
            InvoiceStatus::PartiallyPaid => write!(f, "Partially Paid"),
            InvoiceStatus::Overdue => write!(f, "Overdue"),
            InvoiceStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    pub patient_id: u64,
    pub patient_name: String,
    pub issued_on: Date,
    pub amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn balance(&self) -> f64 {
        self.amount - self.amount_paid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageThread {
    pub id: u64,
    pub subject: String,
    pub participant_name: String,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub last_message_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub thread_id: u64,
    pub sender_name: String,
    pub body: String,
    pub sent_at: String,
    #[serde(default)]
    pub is_mine: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Sent,
    Registered,
    Cancelled,
    Expired,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationStatus::Sent => write!(f, "Sent"),
            InvitationStatus::Registered => write!(f, "Registered"),
            InvitationStatus::Cancelled => write!(f, "Cancelled"),
            InvitationStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// Lifecycle of a patient-invitation email. Pure status display; resend
/// and cancel are delegated to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    pub status: InvitationStatus,
    pub sent_on: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelehealthSession {
    pub id: u64,
    pub appointment_id: u64,
    pub patient_name: String,
    pub staff_name: String,
    pub scheduled_date: Date,
    pub start_time: String,
    pub status: AppointmentStatus,
    /// Set by the server once the session can be joined.
    #[serde(default)]
    pub join_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_enums_use_snake_case_on_the_wire() {
        let s: AppointmentStatus = serde_json::from_str("\"no_show\"").unwrap();
        assert_eq!(s, AppointmentStatus::NoShow);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"no_show\"");

        let i: InvitationStatus = serde_json::from_str("\"registered\"").unwrap();
        assert_eq!(i, InvitationStatus::Registered);
    }

    #[test]
    fn appointment_deserializes_with_missing_flags() {
        let json = r#"{
            "id": 9, "patient_id": 1, "patient_name": "Ana Reyes",
            "staff_id": 2, "staff_name": "Dr. Okafor",
            "appointment_date": "2026-09-14",
            "start_time": "09:30", "end_time": "10:00",
            "duration_minutes": 30,
            "appointment_type": "telehealth",
            "status": "scheduled",
            "reason_for_visit": "Follow-up"
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert!(!appt.can_cancel);
        assert!(!appt.can_complete);
        assert_eq!(appt.appointment_type, AppointmentType::Telehealth);
    }

    #[test]
    fn role_gating_helpers() {
        assert!(Role::Receptionist.is_staff());
        assert!(!Role::Patient.is_staff());
        assert!(!Role::Pharmacy.is_staff());
        assert!(Role::Therapist.is_provider());
        assert!(!Role::Receptionist.is_provider());
    }
}
