//! Ticket payload construction: turns a validated submission into the JSON
//! body the Zendesk ticket endpoint expects.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::models::submission::{FormVariant, Submission};

/// Custom-field and form identifiers of the downstream Zendesk account.
///
/// Deserialized from configuration so the mapper never hardcodes an id;
/// the defaults are the production account's values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TicketFields {
    pub cpf: String,
    pub phone: String,
    pub order_number: String,
    pub message_title: String,
    pub full_name: String,
    pub request_type: String,
    pub user_subject: String,
    pub agent_subject: String,
    pub user_form: String,
    pub agent_form: String,
}

impl Default for TicketFields {
    fn default() -> Self {
        Self {
            cpf: "23142561504795".to_string(),
            phone: "23142638169883".to_string(),
            order_number: "23142687375259".to_string(),
            message_title: "23142701419931".to_string(),
            full_name: "23018418373275".to_string(),
            request_type: "23139054906779".to_string(),
            user_subject: "23142330836891".to_string(),
            agent_subject: "23930834655515".to_string(),
            user_form: "22711355970587".to_string(),
            agent_form: "222739681924507".to_string(),
        }
    }
}

impl TicketFields {
    /// Resolves a raw form id against the two configured forms.
    pub fn variant_of(&self, form_id: &str) -> Option<FormVariant> {
        if form_id == self.user_form {
            Some(FormVariant::User)
        } else if form_id == self.agent_form {
            Some(FormVariant::Agent)
        } else {
            None
        }
    }

    /// The subject custom-field id differs per form.
    pub fn subject_id(&self, variant: FormVariant) -> &str {
        match variant {
            FormVariant::User => &self.user_subject,
            FormVariant::Agent => &self.agent_subject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomField {
    pub id: String,
    pub value: String,
}

impl CustomField {
    fn new(id: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requester {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub body: String,
    pub uploads: Vec<String>,
}

/// The `ticket` object posted to Zendesk. Built synchronously per request
/// and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketPayload {
    pub ticket_form_id: String,
    pub subject: String,
    pub description: String,
    pub requester: Requester,
    pub custom_fields: Vec<CustomField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

impl TicketPayload {
    /// Maps a submission onto the ticket shape for the given form variant.
    ///
    /// The user form cannot produce a ticket without cpf and phone; the check
    /// lives here too, independent of the validation pass. Custom fields keep
    /// a fixed order: title, name, request type, subject, then whichever
    /// identity and order fields are present.
    pub fn from_submission(
        submission: &Submission,
        variant: FormVariant,
        fields: &TicketFields,
    ) -> Result<Self, BridgeError> {
        if variant == FormVariant::User {
            for (field, value) in [("cpf", &submission.cpf), ("phone", &submission.phone)] {
                if value.as_deref().map_or(true, str::is_empty) {
                    return Err(BridgeError::MissingRequiredIdentity { field });
                }
            }
        }

        let mut custom_fields = vec![
            CustomField::new(&fields.message_title, &submission.message_title),
            CustomField::new(&fields.full_name, &submission.full_name),
            CustomField::new(&fields.request_type, &submission.request_type),
            CustomField::new(fields.subject_id(variant), &submission.subject),
        ];
        if let Some(cpf) = present(&submission.cpf) {
            custom_fields.push(CustomField::new(&fields.cpf, cpf));
        }
        if let Some(phone) = present(&submission.phone) {
            custom_fields.push(CustomField::new(&fields.phone, phone));
        }
        if let Some(order) = present(&submission.order_number) {
            custom_fields.push(CustomField::new(&fields.order_number, order));
        }

        let comment = present(&submission.file_token).map(|token| Comment {
            body: submission.description.clone(),
            uploads: vec![token.to_string()],
        });

        Ok(Self {
            ticket_form_id: submission.form_id.clone(),
            subject: submission.message_title.clone(),
            description: submission.description.clone(),
            requester: Requester {
                email: submission.email.clone(),
                name: submission.full_name.clone(),
            },
            custom_fields,
            comment,
        })
    }
}

/// Empty strings count as absent, matching the frontend's cleared inputs.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
