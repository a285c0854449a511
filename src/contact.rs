//! General contact-form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inquiries::InquiryReply;
use crate::validation::{FieldErrors, ValidationError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// All three fields are required.
pub fn validate_contact(contact: &NewContact) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.require("name", &contact.name, "Name is required.");
    errors.require("email", &contact.email, "Email is required.");
    errors.require("message", &contact.message, "Message is required.");
    errors.into_result()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub replies: Vec<InquiryReply>,
}

impl ContactSubmission {
    pub fn from_new(contact: NewContact, submitted_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        validate_contact(&contact)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: contact.name,
            email: contact.email,
            message: contact.message,
            submitted_at,
            replies: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_contact_all_missing() {
        let err = validate_contact(&NewContact::default()).unwrap_err();
        assert_eq!(err.fields().len(), 3);
    }

    #[test]
    fn test_from_new() {
        let contact = NewContact {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            message: "Do you offer group discounts?".to_string(),
        };
        let submission = ContactSubmission::from_new(contact, Utc::now()).unwrap();
        assert_eq!(submission.name, "Ravi");
        assert!(submission.replies.is_empty());
    }

    #[test]
    fn test_from_new_rejects_missing_message() {
        let contact = NewContact {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            message: String::new(),
        };
        let err = ContactSubmission::from_new(contact, Utc::now()).unwrap_err();
        assert!(err.fields().contains("message"));
    }
}
