//! Input validation for inbound patient payloads.
//!
//! Validation runs before any side effect: a draft that fails here never
//! reaches the record store, the billing client, or the notifier.

use chrono::{NaiveDate, Utc};
use enrol_types::{EmailAddress, NonEmptyText};

use crate::error::{ProvisionError, ProvisionResult};
use crate::patient::PatientDraft;

/// The typed result of validating a [`PatientDraft`].
#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    pub name: NonEmptyText,
    pub email: EmailAddress,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// Validates a draft's shape: non-empty name, well-formed email, parseable
/// ISO dates, and a date of birth that is not in the future.
///
/// # Errors
///
/// Returns `ProvisionError::InvalidInput` naming the offending field.
pub fn validate_draft(draft: &PatientDraft) -> ProvisionResult<ValidatedDraft> {
    let name = NonEmptyText::new(&draft.name)
        .map_err(|e| ProvisionError::InvalidInput(format!("name: {e}")))?;

    let email = EmailAddress::parse(&draft.email)
        .map_err(|e| ProvisionError::InvalidInput(format!("email: {e}")))?;

    let date_of_birth = parse_iso_date("date_of_birth", &draft.date_of_birth)?;
    if date_of_birth > Utc::now().date_naive() {
        return Err(ProvisionError::InvalidInput(
            "date_of_birth: must not be in the future".into(),
        ));
    }

    let registered_date = parse_iso_date("registered_date", &draft.registered_date)?;

    Ok(ValidatedDraft {
        name,
        email,
        address: draft.address.clone(),
        date_of_birth,
        registered_date,
    })
}

fn parse_iso_date(field: &str, value: &str) -> ProvisionResult<NaiveDate> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|e| ProvisionError::InvalidInput(format!("{field}: {e}")))
}
