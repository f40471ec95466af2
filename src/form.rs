use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{HtmlFormElement, HtmlInputElement};

use crate::config::{Messages, PageConfig};
use crate::dom;
use crate::error::PageError;

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9-]{9,14}$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Company,
    Phone,
}

impl Field {
    pub fn input_name(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Phone => "phone",
        }
    }
}

/// Raw values as read from the form at submit time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub company: String,
    pub phone: String,
    pub privacy: bool,
}

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("company or name is required")]
    MissingCompany,
    #[error("contact number is required")]
    MissingPhone,
    #[error("contact number has an invalid format")]
    InvalidPhone,
    #[error("privacy consent is required")]
    PrivacyNotAccepted,
}

impl ValidationError {
    pub fn message<'a>(&self, messages: &'a Messages) -> &'a str {
        match self {
            ValidationError::MissingCompany => &messages.missing_company,
            ValidationError::MissingPhone => &messages.missing_phone,
            ValidationError::InvalidPhone => &messages.invalid_phone,
            ValidationError::PrivacyNotAccepted => &messages.privacy_required,
        }
    }

    pub fn focus(&self) -> Option<Field> {
        match self {
            ValidationError::MissingCompany => Some(Field::Company),
            ValidationError::MissingPhone | ValidationError::InvalidPhone => Some(Field::Phone),
            ValidationError::PrivacyNotAccepted => None,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub company: String,
    pub phone: String,
    pub timestamp: String,
}

pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERN.is_match(&compact)
}

/// Checks run in order and stop at the first failure.
pub fn validate(fields: &ContactFields, now: DateTime<Utc>) -> Result<Submission, ValidationError> {
    let company = fields.company.trim();
    let phone = fields.phone.trim();

    if company.is_empty() {
        return Err(ValidationError::MissingCompany);
    }
    if phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if !is_valid_phone(&fields.phone) {
        return Err(ValidationError::InvalidPhone);
    }
    if !fields.privacy {
        return Err(ValidationError::PrivacyNotAccepted);
    }

    Ok(Submission {
        company: company.to_string(),
        phone: phone.to_string(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// What a submit attempt shows the user and does to the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub alert: String,
    pub focus: Option<Field>,
    pub reset: bool,
    pub submission: Option<Submission>,
}

/// Failures keep the typed values and point at the offending field. Success
/// clears every field.
pub fn outcome(fields: &ContactFields, messages: &Messages, now: DateTime<Utc>) -> Outcome {
    match validate(fields, now) {
        Err(e) => {
            info!("Contact form rejected: {}", e);
            Outcome {
                alert: e.message(messages).to_string(),
                focus: e.focus(),
                reset: false,
                submission: None,
            }
        }
        Ok(submission) => Outcome {
            alert: messages.success.clone(),
            focus: None,
            reset: true,
            submission: Some(submission),
        },
    }
}

struct ContactForm {
    form: HtmlFormElement,
    company: HtmlInputElement,
    phone: HtmlInputElement,
    privacy: HtmlInputElement,
    messages: Messages,
}

impl ContactForm {
    fn fields(&self) -> ContactFields {
        ContactFields {
            company: self.company.value(),
            phone: self.phone.value(),
            privacy: self.privacy.checked(),
        }
    }

    fn input(&self, field: Field) -> &HtmlInputElement {
        match field {
            Field::Company => &self.company,
            Field::Phone => &self.phone,
        }
    }

    fn submit(&self) {
        let outcome = outcome(&self.fields(), &self.messages, Utc::now());
        if let Some(submission) = &outcome.submission {
            match serde_json::to_string(submission) {
                Ok(json) => info!("Form submitted: {}", json),
                Err(e) => warn!("Could not serialize submission: {}", e),
            }
            if let Ok(value) = serde_wasm_bindgen::to_value(submission) {
                gloo_console::log!("Form submitted:", value);
            }
        }
        if let Some(field) = outcome.focus {
            let _ = self.input(field).focus();
        }
        dom::alert(&outcome.alert);
        if outcome.reset {
            self.form.reset();
        }
    }
}

fn named_input(form: &HtmlFormElement, name: &str) -> Result<HtmlInputElement, PageError> {
    form.query_selector(&format!("input[name=\"{}\"]", name))?
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .ok_or_else(|| PageError::MissingElement(format!("input[name=\"{}\"]", name)))
}

pub fn init(config: &PageConfig) -> Result<(), PageError> {
    let document = dom::document()?;
    let Some(form) = document
        .get_element_by_id(&config.contact_form_id)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        return Ok(());
    };

    let contact = Rc::new(ContactForm {
        company: named_input(&form, Field::Company.input_name())?,
        phone: named_input(&form, Field::Phone.input_name())?,
        privacy: named_input(&form, "privacy")?,
        messages: config.messages.clone(),
        form,
    });

    let handler = contact.clone();
    dom::listen(&contact.form, "submit", move |event| {
        event.prevent_default();
        handler.submit();
    })?;
    info!("Contact form validation bound to #{}", config.contact_form_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    fn fields(company: &str, phone: &str, privacy: bool) -> ContactFields {
        ContactFields {
            company: company.to_string(),
            phone: phone.to_string(),
            privacy,
        }
    }

    #[test]
    fn empty_company_stops_at_first_check() {
        let err = validate(&fields("   ", "12ab", false), now()).unwrap_err();
        assert_eq!(err, ValidationError::MissingCompany);
        assert_eq!(err.focus(), Some(Field::Company));
    }

    #[test]
    fn blank_phone_is_missing_not_malformed() {
        let err = validate(&fields("Acme", " \t", false), now()).unwrap_err();
        assert_eq!(err, ValidationError::MissingPhone);
        assert_eq!(err.focus(), Some(Field::Phone));
    }

    #[test]
    fn letters_in_phone_fail_format_check() {
        let err = validate(&fields("Acme", "12ab", true), now()).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhone);
    }

    #[test]
    fn phone_length_bounds() {
        assert!(!is_valid_phone("12345678"));
        assert!(is_valid_phone("123456789"));
        assert!(is_valid_phone("12345678901234"));
        assert!(!is_valid_phone("123456789012345"));
        assert!(is_valid_phone("010 1234 5678"));
    }

    #[test]
    fn missing_consent_has_no_focus_target() {
        let err = validate(&fields("Acme", "010-1234-5678", false), now()).unwrap_err();
        assert_eq!(err, ValidationError::PrivacyNotAccepted);
        assert_eq!(err.focus(), None);
    }

    #[test]
    fn valid_submission_is_trimmed_and_stamped() {
        let submission = validate(&fields("  Acme ", " 010-1234-5678 ", true), now()).unwrap();
        assert_eq!(submission.company, "Acme");
        assert_eq!(submission.phone, "010-1234-5678");
        assert_eq!(submission.timestamp, "2026-03-04T05:06:07.000Z");
    }

    #[test]
    fn accepted_submission_resets_with_success_message() {
        let messages = Messages::default();
        let result = outcome(&fields("Acme", "010-1234-5678", true), &messages, now());
        assert!(result.reset);
        assert_eq!(result.alert, messages.success);
        assert_eq!(result.focus, None);

        let submission = result.submission.unwrap();
        assert_eq!(submission.company, "Acme");
        assert_eq!(submission.phone, "010-1234-5678");
    }

    #[test]
    fn rejected_submission_never_resets() {
        let messages = Messages::default();
        let cases = [
            (fields("", "010-1234-5678", true), &messages.missing_company, Some(Field::Company)),
            (fields("Acme", "", true), &messages.missing_phone, Some(Field::Phone)),
            (fields("Acme", "12ab", true), &messages.invalid_phone, Some(Field::Phone)),
            (fields("Acme", "010-1234-5678", false), &messages.privacy_required, None),
        ];
        for (input, alert, focus) in cases {
            let result = outcome(&input, &messages, now());
            assert!(!result.reset);
            assert_eq!(&result.alert, alert);
            assert_eq!(result.focus, focus);
            assert_eq!(result.submission, None);
        }
    }

    #[test]
    fn messages_map_to_configured_text() {
        let messages = Messages::default();
        assert_eq!(
            ValidationError::MissingPhone.message(&messages),
            messages.missing_phone
        );
        assert_eq!(
            ValidationError::PrivacyNotAccepted.message(&messages),
            messages.privacy_required
        );
    }
}
