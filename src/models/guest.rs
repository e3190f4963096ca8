use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Invitee response, stored upper-case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    Accepted,
    Declined,
    Maybe,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 3] = [
        RsvpStatus::Accepted,
        RsvpStatus::Declined,
        RsvpStatus::Maybe,
    ];

    /// Lower-case token used in RSVP links
    pub fn token(self) -> &'static str {
        match self {
            RsvpStatus::Accepted => "accepted",
            RsvpStatus::Declined => "declined",
            RsvpStatus::Maybe => "maybe",
        }
    }

    /// Value written to the `rsvpStatus` field
    pub fn as_stored(self) -> &'static str {
        match self {
            RsvpStatus::Accepted => "ACCEPTED",
            RsvpStatus::Declined => "DECLINED",
            RsvpStatus::Maybe => "MAYBE",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_stored() == value)
    }

    /// Link label shown in the invitation
    pub fn label(self) -> &'static str {
        match self {
            RsvpStatus::Accepted => "Accept",
            RsvpStatus::Declined => "Decline",
            RsvpStatus::Maybe => "Maybe",
        }
    }
}

/// Only the exact lower-case link tokens are accepted.
impl FromStr for RsvpStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.token() == s)
            .ok_or_else(|| AppError::InvalidRsvpStatus(s.to_string()))
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stored())
    }
}

/// Guest document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub email: String,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_status: Option<RsvpStatus>,
}

impl Guest {
    pub fn new(email: String, event_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            event_id,
            rsvp_status: None,
        }
    }
}

/// Request to create a guest
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestRequest {
    pub email: String,
    pub event_id: String,
}

/// Payload delivered to the invitation notifier when a guest is created
#[derive(Debug, Clone, PartialEq)]
pub struct GuestCreated {
    pub guest_id: String,
    pub email: String,
    pub event_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFields {
    email: String,
    event_id: String,
}

impl GuestCreated {
    /// Decode the record snapshot attached to a creation event.
    pub fn decode(guest_id: &str, data: &str) -> Result<Self> {
        if guest_id.is_empty() {
            return Err(AppError::InvalidPayload("missing guest id".to_string()));
        }

        let fields: CreatedFields = serde_json::from_str(data)
            .map_err(|e| AppError::InvalidPayload(format!("guest {}: {}", guest_id, e)))?;

        if fields.email.trim().is_empty() {
            return Err(AppError::InvalidPayload(format!(
                "guest {}: empty email",
                guest_id
            )));
        }
        if fields.event_id.trim().is_empty() {
            return Err(AppError::InvalidPayload(format!(
                "guest {}: empty eventId",
                guest_id
            )));
        }

        Ok(Self {
            guest_id: guest_id.to_string(),
            email: fields.email,
            event_id: fields.event_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_valid_tokens() {
        assert_eq!("accepted".parse::<RsvpStatus>().unwrap(), RsvpStatus::Accepted);
        assert_eq!("declined".parse::<RsvpStatus>().unwrap(), RsvpStatus::Declined);
        assert_eq!("maybe".parse::<RsvpStatus>().unwrap(), RsvpStatus::Maybe);
    }

    #[test]
    fn test_parse_rejects_other_casing_and_junk() {
        for token in ["", "Accepted", "ACCEPTED", "yes", "maybe ", "accept"] {
            assert!(
                token.parse::<RsvpStatus>().is_err(),
                "{:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_stored_form_is_upper_case() {
        for status in RsvpStatus::ALL {
            assert_eq!(status.as_stored(), status.token().to_uppercase());
            assert_eq!(RsvpStatus::from_stored(status.as_stored()), Some(status));
        }
        assert_eq!(RsvpStatus::from_stored("accepted"), None);
    }

    #[test]
    fn test_guest_serializes_camel_case() {
        let guest = Guest {
            id: "g1".to_string(),
            email: "a@b.com".to_string(),
            event_id: "Summer Party".to_string(),
            rsvp_status: Some(RsvpStatus::Maybe),
        };

        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "g1",
                "email": "a@b.com",
                "eventId": "Summer Party",
                "rsvpStatus": "MAYBE"
            })
        );
    }

    #[test]
    fn test_decode_created_payload() {
        let created =
            GuestCreated::decode("g1", r#"{"email":"a@b.com","eventId":"Summer Party"}"#)
                .expect("Should decode");

        assert_eq!(
            created,
            GuestCreated {
                guest_id: "g1".to_string(),
                email: "a@b.com".to_string(),
                event_id: "Summer Party".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let missing_event = GuestCreated::decode("g1", r#"{"email":"a@b.com"}"#);
        assert!(matches!(missing_event, Err(AppError::InvalidPayload(_))));

        let wrong_type = GuestCreated::decode("g1", r#"{"email":5,"eventId":"x"}"#);
        assert!(matches!(wrong_type, Err(AppError::InvalidPayload(_))));

        let empty_email = GuestCreated::decode("g1", r#"{"email":" ","eventId":"x"}"#);
        assert!(matches!(empty_email, Err(AppError::InvalidPayload(_))));

        let empty_event = GuestCreated::decode("g1", r#"{"email":"a@b.com","eventId":""}"#);
        assert!(matches!(empty_event, Err(AppError::InvalidPayload(_))));

        let no_id = GuestCreated::decode("", r#"{"email":"a@b.com","eventId":"x"}"#);
        assert!(matches!(no_id, Err(AppError::InvalidPayload(_))));
    }
}
