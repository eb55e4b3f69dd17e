//! Client-side form validation.
//!
//! Validation runs before submission and renders inline, per field.
//! Server-side 422 payloads merge into the same map so both sources of
//! truth land in one display. Vital-sign checks are warnings only and
//! never block a save.

use crate::models::{AppointmentRequest, AvailabilitySlot, VitalSigns};
use std::collections::{BTreeMap, HashMap};
use time::Date;

pub const MIN_APPOINTMENT_MINUTES: u32 = 15;

/// Per-field inline errors, ordered for stable rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Folds a server 422 payload into the client-side errors.
    pub fn merge_server(&mut self, server: HashMap<String, Vec<String>>) {
        for (field, messages) in server {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message per field, for compact single-line rendering.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.errors.iter()
    }
}

/// Validates the appointment form against the last-fetched slot list.
///
/// `today` is passed in rather than read from the clock so the rules are
/// deterministic. `slots` is whatever the latest availability check
/// returned; a chosen start time that is not in it is rejected, matching
/// the submit gating in the booking form.
pub fn validate_appointment(
    request: &AppointmentRequest,
    today: Date,
    slots: &[AvailabilitySlot],
) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if request.patient_id.is_none() {
        errors.add("patient_id", "Patient is required.");
    }
    if request.staff_id.is_none() {
        errors.add("staff_id", "Provider is required.");
    }

    match request.appointment_date {
        None => errors.add("appointment_date", "Appointment date is required."),
        Some(date) if date < today => {
            errors.add("appointment_date", "Appointment date cannot be in the past.")
        }
        Some(_) => {}
    }

    if request.start_time.trim().is_empty() {
        errors.add("start_time", "Start time is required.");
    } else if !slots.iter().any(|s| s.start_time == request.start_time) {
        errors.add("start_time", "The selected time is not an available slot.");
    }

    if request.reason_for_visit.trim().is_empty() {
        errors.add("reason_for_visit", "Reason for visit is required.");
    }

    if request.duration_minutes < MIN_APPOINTMENT_MINUTES {
        errors.add(
            "duration_minutes",
            format!("Duration must be at least {MIN_APPOINTMENT_MINUTES} minutes."),
        );
    }

    errors
}

/// Sanity ranges for vital-sign readings. Out-of-range values produce
/// warnings that are displayed but never block the save.
pub fn vital_warnings(vitals: &VitalSigns) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(systolic) = vitals.systolic_bp {
        if !(70..=200).contains(&systolic) {
            warnings.push(format!(
                "Systolic BP {systolic} is outside the expected range (70-200)."
            ));
        }
    }
    if let Some(diastolic) = vitals.diastolic_bp {
        if !(40..=120).contains(&diastolic) {
            warnings.push(format!(
                "Diastolic BP {diastolic} is outside the expected range (40-120)."
            ));
        }
    }
    if let Some(heart_rate) = vitals.heart_rate {
        if !(40..=150).contains(&heart_rate) {
            warnings.push(format!(
                "Heart rate {heart_rate} is outside the expected range (40-150)."
            ));
        }
    }
    if let Some(temperature) = vitals.temperature {
        if !(95.0..=106.0).contains(&temperature) {
            warnings.push(format!(
                "Temperature {temperature:.1}\u{b0}F is outside the expected range (95.0-106.0)."
            ));
        }
    }

    warnings
}

/// BMI from weight in pounds and height in inches, rounded to one
/// decimal. Returns `None` for non-positive inputs.
pub fn compute_bmi(weight_lbs: f64, height_inches: f64) -> Option<f64> {
    if weight_lbs <= 0.0 || height_inches <= 0.0 {
        return None;
    }
    let kg = weight_lbs * 0.453592;
    let meters = height_inches * 0.0254;
    Some((kg / (meters * meters) * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn slots() -> Vec<AvailabilitySlot> {
        vec![
            AvailabilitySlot {
                start_time: "09:00".into(),
                end_time: "09:30".into(),
            },
            AvailabilitySlot {
                start_time: "09:30".into(),
                end_time: "10:00".into(),
            },
        ]
    }

    fn valid_request() -> AppointmentRequest {
        AppointmentRequest {
            patient_id: Some(1),
            staff_id: Some(2),
            appointment_date: Some(date!(2026 - 09 - 14)),
            start_time: "09:30".into(),
            duration_minutes: 30,
            appointment_type: None,
            reason_for_visit: "Annual physical".into(),
            fee: None,
            reminder_enabled: false,
        }
    }

    const TODAY: Date = date!(2026 - 08 - 30);

    #[test]
    fn valid_request_passes() {
        assert!(validate_appointment(&valid_request(), TODAY, &slots()).is_empty());
    }

    #[test]
    fn required_fields_are_enforced() {
        let request = AppointmentRequest::default();
        let errors = validate_appointment(&request, TODAY, &slots());
        for field in [
            "patient_id",
            "staff_id",
            "appointment_date",
            "start_time",
            "reason_for_visit",
        ] {
            assert!(errors.first(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn past_dates_are_rejected_today_is_not() {
        let mut request = valid_request();
        request.appointment_date = Some(date!(2026 - 08 - 29));
        let errors = validate_appointment(&request, TODAY, &slots());
        assert_eq!(
            errors.first("appointment_date"),
            Some("Appointment date cannot be in the past.")
        );

        request.appointment_date = Some(TODAY);
        assert!(validate_appointment(&request, TODAY, &slots()).is_empty());
    }

    #[test]
    fn short_durations_are_rejected() {
        let mut request = valid_request();
        request.duration_minutes = 14;
        let errors = validate_appointment(&request, TODAY, &slots());
        assert!(errors.first("duration_minutes").is_some());

        request.duration_minutes = 15;
        assert!(validate_appointment(&request, TODAY, &slots()).is_empty());
    }

    #[test]
    fn start_time_must_match_a_fetched_slot() {
        let mut request = valid_request();
        request.start_time = "11:00".into();
        let errors = validate_appointment(&request, TODAY, &slots());
        assert_eq!(
            errors.first("start_time"),
            Some("The selected time is not an available slot.")
        );

        // An empty availability list rejects every choice.
        let errors = validate_appointment(&valid_request(), TODAY, &[]);
        assert!(errors.first("start_time").is_some());
    }

    #[test]
    fn server_errors_merge_into_field_map() {
        let mut errors = validate_appointment(&valid_request(), TODAY, &slots());
        assert!(errors.is_empty());

        let mut server = HashMap::new();
        server.insert(
            "start_time".to_string(),
            vec!["That time was just booked.".to_string()],
        );
        errors.merge_server(server);
        assert_eq!(errors.first("start_time"), Some("That time was just booked."));
    }

    #[test]
    fn vitals_in_range_produce_no_warnings() {
        let vitals = VitalSigns {
            systolic_bp: Some(120),
            diastolic_bp: Some(80),
            heart_rate: Some(72),
            temperature: Some(98.6),
            ..Default::default()
        };
        assert!(vital_warnings(&vitals).is_empty());
    }

    #[test]
    fn out_of_range_vitals_warn_without_blocking() {
        let vitals = VitalSigns {
            systolic_bp: Some(210),
            diastolic_bp: Some(30),
            heart_rate: Some(160),
            temperature: Some(107.2),
            ..Default::default()
        };
        let warnings = vital_warnings(&vitals);
        assert_eq!(warnings.len(), 4);
    }

    #[test]
    fn boundary_vitals_are_accepted() {
        let vitals = VitalSigns {
            systolic_bp: Some(70),
            diastolic_bp: Some(120),
            heart_rate: Some(40),
            temperature: Some(106.0),
            ..Default::default()
        };
        assert!(vital_warnings(&vitals).is_empty());
    }

    #[test]
    fn bmi_matches_reference_formula() {
        assert_eq!(compute_bmi(150.0, 68.0), Some(22.8));
        assert_eq!(compute_bmi(200.0, 70.0), Some(28.7));
        assert_eq!(compute_bmi(0.0, 68.0), None);
        assert_eq!(compute_bmi(150.0, -1.0), None);
    }
}
