//! Support-form submission entity and its field-by-field validation rules.
//!
//! Messages are the Portuguese strings the form frontend renders next to each
//! field, keyed by the wire-level (camelCase) field name.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::cpf;
use crate::models::ticket::TicketFields;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX is a valid regex pattern")
});

static PHONE_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^\(\d{2}\) \d{5}-\d{4}$").expect("PHONE_REGEX is a valid regex pattern")
});

const REQUEST_TYPES: [&str; 3] = ["duvida", "problema", "outros"];

/// Which of the two published forms a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVariant {
    User,
    Agent,
}

/// One localized message per failing field, keyed by wire-level field name.
pub type FieldErrors = BTreeMap<String, String>;

/// A raw form submission as posted by the frontend.
///
/// Every key is tolerated-missing at the serde layer so that presence is
/// judged by the validation rules, never by deserialization failures.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub form_id: String,

    #[validate(
        length(min = 1, message = "E-mail não pode ficar em branco"),
        custom(function = "email_shape")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Título da mensagem não pode ficar em branco"))]
    pub message_title: String,

    #[validate(length(min = 1, message = "Descrição não pode ficar em branco"))]
    pub description: String,

    #[validate(
        length(min = 1, message = "Escolha uma opção"),
        custom(function = "known_request_type")
    )]
    pub request_type: String,

    #[validate(length(min = 1, message = "Escolha uma opção"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Nome completo não pode ficar em branco"))]
    pub full_name: String,

    /// Required on the user form; checked for a valid checksum on both.
    #[validate(custom(function = "checksummed_cpf"))]
    pub cpf: Option<String>,

    /// Required on the user form; checked against the national format on both.
    #[validate(custom(function = "national_phone"))]
    pub phone: Option<String>,

    #[validate(custom(function = "digits_only_order"))]
    pub order_number: Option<String>,

    /// Upload token returned by the attachment endpoint, if the user attached
    /// a file before submitting.
    pub file_token: Option<String>,

    pub file_name: Option<String>,
}

/// Runs every rule and collects one message per failing field.
///
/// Resolving the form variant is part of validation: an unknown `formId` is a
/// field error like any other. Blank-vs-present rules for cpf and phone apply
/// only to the user form; format rules apply to both whenever a value is
/// non-empty.
pub fn validate_submission(
    submission: &Submission,
    fields: &TicketFields,
) -> Result<FormVariant, FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Err(violations) = submission.validate() {
        for (field, field_errors) in violations.field_errors() {
            if let Some(message) = field_errors.iter().find_map(|e| e.message.as_ref()) {
                errors.insert(wire_name(field).to_string(), message.to_string());
            }
        }
    }

    let variant = fields.variant_of(&submission.form_id);
    if variant.is_none() {
        errors.insert("formId".to_string(), "Formulário inválido".to_string());
    }

    if variant == Some(FormVariant::User) {
        if is_blank(&submission.cpf) {
            errors.insert("cpf".to_string(), "CPF não pode ficar em branco".to_string());
        }
        if is_blank(&submission.phone) {
            errors.insert(
                "phone".to_string(),
                "Telefone não pode ficar em branco".to_string(),
            );
        }
    }

    match variant {
        Some(variant) if errors.is_empty() => Ok(variant),
        _ => Err(errors),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Maps a struct field name back to the camelCase key the frontend sent.
fn wire_name(field: &str) -> &str {
    match field {
        "form_id" => "formId",
        "message_title" => "messageTitle",
        "request_type" => "requestType",
        "full_name" => "fullName",
        "order_number" => "orderNumber",
        other => other,
    }
}

// Custom rules accept the empty string: blankness is the length rule's (or,
// for cpf and phone, the variant-specific requiredness check's) concern.

fn email_shape(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || EMAIL_REGEX.is_match(email) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_email");
    err.message = Some("Digite um e-mail válido".into());
    Err(err)
}

fn known_request_type(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || REQUEST_TYPES.contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_request_type");
    err.message = Some("Escolha uma opção".into());
    Err(err)
}

fn checksummed_cpf(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || cpf::is_valid(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_cpf");
    err.message = Some("CPF inválido".into());
    Err(err)
}

fn national_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if !PHONE_REGEX.is_match(value) {
        let mut err = ValidationError::new("invalid_phone_format");
        err.message = Some("O telefone deve seguir o formato (##) #####-####".into());
        return Err(err);
    }
    let digits: Vec<char> = value.chars().filter(char::is_ascii_digit).collect();
    if digits.iter().all(|&d| d == digits[0]) {
        let mut err = ValidationError::new("repeated_digits");
        err.message = Some("Insira um telefone válido".into());
        return Err(err);
    }
    Ok(())
}

fn digits_only_order(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let mut err = ValidationError::new("non_numeric_order");
    err.message = Some("O número do pedido deve conter apenas números".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> TicketFields {
        TicketFields::default()
    }

    fn user_submission() -> Submission {
        Submission {
            form_id: "22711355970587".to_string(),
            email: "maria@example.com".to_string(),
            message_title: "Pedido atrasado".to_string(),
            description: "Meu pedido não chegou".to_string(),
            request_type: "problema".to_string(),
            subject: "Entrega".to_string(),
            full_name: "Maria da Silva".to_string(),
            cpf: Some("529.982.247-25".to_string()),
            phone: Some("(11) 91234-5678".to_string()),
            ..Submission::default()
        }
    }

    fn agent_submission() -> Submission {
        Submission {
            form_id: "222739681924507".to_string(),
            email: "atendente@example.com".to_string(),
            message_title: "Acesso ao painel".to_string(),
            description: "Não consigo entrar no painel de atendimento".to_string(),
            request_type: "duvida".to_string(),
            subject: "Acesso".to_string(),
            full_name: "João Pereira".to_string(),
            ..Submission::default()
        }
    }

    #[test]
    fn accepts_complete_user_submission() {
        assert_eq!(
            validate_submission(&user_submission(), &fields()),
            Ok(FormVariant::User)
        );
    }

    #[test]
    fn accepts_agent_submission_without_identity_fields() {
        assert_eq!(
            validate_submission(&agent_submission(), &fields()),
            Ok(FormVariant::Agent)
        );
    }

    #[test]
    fn reports_missing_description_alone() {
        let mut submission = user_submission();
        submission.description = String::new();

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("description").map(String::as_str),
            Some("Descrição não pode ficar em branco")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn rejects_repeated_digit_phone_despite_format_match() {
        let mut submission = user_submission();
        submission.phone = Some("(11) 11111-1111".to_string());

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("Insira um telefone válido")
        );
    }

    #[test]
    fn rejects_malformed_phone_with_format_message() {
        let mut submission = user_submission();
        submission.phone = Some("11 91234-5678".to_string());

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("O telefone deve seguir o formato (##) #####-####")
        );
    }

    #[test]
    fn distinguishes_bad_checksum_from_blank_cpf() {
        let mut submission = user_submission();
        submission.cpf = Some("529.982.247-24".to_string());
        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(errors.get("cpf").map(String::as_str), Some("CPF inválido"));

        submission.cpf = Some(String::new());
        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("cpf").map(String::as_str),
            Some("CPF não pode ficar em branco")
        );
    }

    #[test]
    fn requires_identity_fields_on_the_user_form() {
        let mut submission = user_submission();
        submission.cpf = None;
        submission.phone = None;

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("cpf").map(String::as_str),
            Some("CPF não pode ficar em branco")
        );
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("Telefone não pode ficar em branco")
        );
    }

    #[test]
    fn still_checks_identity_formats_on_the_agent_form() {
        let mut submission = agent_submission();
        submission.cpf = Some("123".to_string());

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(errors.get("cpf").map(String::as_str), Some("CPF inválido"));
    }

    #[test]
    fn rejects_unknown_form_id() {
        let mut submission = user_submission();
        submission.form_id = "999".to_string();

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("formId").map(String::as_str),
            Some("Formulário inválido")
        );
    }

    #[test]
    fn rejects_unknown_request_type() {
        let mut submission = agent_submission();
        submission.request_type = "reclamacao".to_string();

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("requestType").map(String::as_str),
            Some("Escolha uma opção")
        );
    }

    #[test]
    fn rejects_misshapen_email() {
        let mut submission = user_submission();
        submission.email = "maria@example".to_string();
        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("Digite um e-mail válido")
        );

        submission.email = String::new();
        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("E-mail não pode ficar em branco")
        );
    }

    #[test]
    fn rejects_non_numeric_order_number() {
        let mut submission = user_submission();
        submission.order_number = Some("12a45".to_string());
        let errors = validate_submission(&submission, &fields()).unwrap_err();
        assert_eq!(
            errors.get("orderNumber").map(String::as_str),
            Some("O número do pedido deve conter apenas números")
        );

        submission.order_number = Some("12345".to_string());
        assert!(validate_submission(&submission, &fields()).is_ok());
    }

    #[test]
    fn collects_every_violation_at_once() {
        let submission = Submission {
            form_id: "22711355970587".to_string(),
            ..Submission::default()
        };

        let errors = validate_submission(&submission, &fields()).unwrap_err();
        for field in [
            "email",
            "messageTitle",
            "description",
            "requestType",
            "subject",
            "fullName",
            "cpf",
            "phone",
        ] {
            assert!(errors.contains_key(field), "missing entry for {field}");
        }
    }

    #[test]
    fn deserializes_camel_case_and_tolerates_missing_keys() {
        let submission: Submission = serde_json::from_str(
            r#"{"formId":"22711355970587","email":"x@y.z","messageTitle":"Oi"}"#,
        )
        .unwrap();

        assert_eq!(submission.form_id, "22711355970587");
        assert_eq!(submission.message_title, "Oi");
        assert!(submission.description.is_empty());
        assert!(submission.cpf.is_none());
    }
}
