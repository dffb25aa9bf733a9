//! Typed schemas for the pipe-delimited action parameters.
//!
//! The agent runtime passes every parameter as one string; these types pin
//! the positional fields to names, mark which are required, and feed the
//! same field list into the description the LLM is prompted with.

use callcenter_core::sms::DEFAULT_COUNTRY_PREFIX;
use callcenter_core::{ActionError, ProviderKey};

pub const FIELD_DELIMITER: char = '|';

/// Digits in a North American number without the country code.
pub const NATIONAL_NUMBER_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub const FIND_SLOTS_FIELDS: [ParamField; 4] = [
    ParamField { name: "first_name", required: true, description: "Patient first name" },
    ParamField { name: "address", required: true, description: "Patient address" },
    ParamField {
        name: "reason",
        required: true,
        description: "Patient chief medical reason for the visit",
    },
    ParamField {
        name: "referral",
        required: false,
        description: "Referring doctor as \"<first name> <last name>\" all lowercased; leave empty \
                      (keep the trailing `|`) when there is none",
    },
];

pub const SEND_TEXT_FIELDS: [ParamField; 5] = [
    ParamField { name: "first_name", required: true, description: "Patient first name" },
    ParamField {
        name: "phone_digits",
        required: true,
        description: "Number to text, digits only without country code (e.g. 4155550123)",
    },
    ParamField { name: "doctor", required: true, description: "Doctor for the appointment" },
    ParamField { name: "address", required: true, description: "Location of the appointment" },
    ParamField { name: "datetime", required: true, description: "Date and time of the appointment" },
];

pub fn split_fields(raw: &str) -> Vec<&str> {
    raw.split(FIELD_DELIMITER).map(str::trim).collect()
}

/// How a lenient parse lined up with the declared field count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact,
    Missing { expected: usize, found: usize },
    Extra { expected: usize, found: usize },
}

impl Arity {
    fn check(expected: usize, found: usize) -> Self {
        match found.cmp(&expected) {
            std::cmp::Ordering::Equal => Self::Exact,
            std::cmp::Ordering::Less => Self::Missing { expected, found },
            std::cmp::Ordering::Greater => Self::Extra { expected, found },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindSlotsParams {
    pub first_name: String,
    pub address: String,
    pub reason: String,
    pub referral: Option<String>,
}

impl FindSlotsParams {
    /// Never fails: missing trailing fields default to empty, extras are dropped.
    pub fn parse(raw: &str) -> (Self, Arity) {
        let fields = split_fields(raw);
        let arity = Arity::check(FIND_SLOTS_FIELDS.len(), fields.len());
        let field =
            |index: usize| fields.get(index).map(|value| value.to_string()).unwrap_or_default();

        let referral = field(3);
        let params = Self {
            first_name: field(0),
            address: field(1),
            reason: field(2),
            referral: (!referral.is_empty()).then_some(referral),
        };

        (params, arity)
    }

    pub fn referral_key(&self) -> Option<ProviderKey> {
        self.referral.as_deref().and_then(ProviderKey::normalize)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTextParams {
    pub first_name: String,
    pub phone_digits: String,
    pub doctor: String,
    pub address: String,
    pub datetime: String,
}

impl SendTextParams {
    pub fn parse(raw: &str) -> Result<Self, ActionError> {
        let fields = split_fields(raw);
        let [first_name, phone_digits, doctor, address, datetime] = fields.as_slice() else {
            return Err(ActionError::malformed(
                "send_text",
                format!(
                    "expected {} `|`-separated fields ({}), got {}",
                    SEND_TEXT_FIELDS.len(),
                    field_names(&SEND_TEXT_FIELDS),
                    fields.len()
                ),
            ));
        };

        let values = [*first_name, *phone_digits, *doctor, *address, *datetime];
        if let Some(blank) = SEND_TEXT_FIELDS
            .iter()
            .zip(values)
            .find(|(field, value)| field.required && value.is_empty())
        {
            return Err(ActionError::malformed(
                "send_text",
                format!("`{}` must not be empty", blank.0.name),
            ));
        }

        if !phone_digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ActionError::malformed(
                "send_text",
                "`phone_digits` must contain digits only",
            ));
        }

        // A leading country code 1 is already implied by the `+1` prefix.
        let national = match (phone_digits.len(), phone_digits.strip_prefix('1')) {
            (NATIONAL_NUMBER_LEN, _) => *phone_digits,
            (len, Some(rest)) if len == NATIONAL_NUMBER_LEN + 1 => rest,
            (len, _) => {
                return Err(ActionError::malformed(
                    "send_text",
                    format!(
                        "`phone_digits` must be {NATIONAL_NUMBER_LEN} digits (or 11 starting \
                         with 1), got {len}"
                    ),
                ));
            }
        };

        Ok(Self {
            first_name: first_name.to_string(),
            phone_digits: national.to_string(),
            doctor: doctor.to_string(),
            address: address.to_string(),
            datetime: datetime.to_string(),
        })
    }

    pub fn destination(&self) -> String {
        format!("{DEFAULT_COUNTRY_PREFIX}{}", self.phone_digits)
    }

    pub fn confirmation_body(&self) -> String {
        format!(
            "Dear {}: your appointment with {} at {} at {} has been confirmed. Do not reply.",
            self.first_name, self.doctor, self.address, self.datetime
        )
    }
}

pub fn field_names(fields: &[ParamField]) -> String {
    let separator = FIELD_DELIMITER.to_string();
    fields.iter().map(|field| field.name).collect::<Vec<_>>().join(separator.as_str())
}
