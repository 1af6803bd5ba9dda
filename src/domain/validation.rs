//! Local form validation for create and edit modals.
//!
//! Forms arrive as raw text keyed by field name. Validation turns them into
//! typed JSON [`Fields`] or rejects them with a [`ValidationError`]; either way
//! nothing is sent to the remote service until this step succeeds.

use crate::domain::error::ValidationError;
use crate::domain::record::{Fields, ID_FIELD};
use crate::domain::schema::EntityKind;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Raw form contents: field name to the text the user typed.
pub type FormInput = BTreeMap<String, String>;

/// Whether a form creates a new record or edits an existing one.
///
/// Edits only require the required fields that the form actually carries, so
/// a partial edit (e.g. just the price) is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIntent {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Text,
    Email,
    NonNegativeInt,
    PositiveInt,
    NonNegativeNumber,
    Rating,
    Bool,
    Role,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    rule: Rule,
    required: bool,
}

const fn required(name: &'static str, rule: Rule) -> FieldRule {
    FieldRule { name, rule, required: true }
}

const fn optional(name: &'static str, rule: Rule) -> FieldRule {
    FieldRule { name, rule, required: false }
}

const BOOK_RULES: &[FieldRule] = &[
    required("title", Rule::Text),
    required("author", Rule::Text),
    optional("category", Rule::Text),
    optional("description", Rule::Text),
    optional("viewCount", Rule::NonNegativeInt),
    optional("rating", Rule::Rating),
    optional("isPublished", Rule::Bool),
];

const USER_RULES: &[FieldRule] = &[
    required("name", Rule::Text),
    required("email", Rule::Email),
    optional("role", Rule::Role),
    optional("credits", Rule::NonNegativeInt),
    optional("isBanned", Rule::Bool),
    optional("banReason", Rule::Text),
    optional("isSuspended", Rule::Bool),
];

const CREDIT_PACKAGE_RULES: &[FieldRule] = &[
    required("name", Rule::Text),
    optional("description", Rule::Text),
    required("credits", Rule::PositiveInt),
    required("price", Rule::NonNegativeNumber),
    optional("isActive", Rule::Bool),
];

const fn rules_for(kind: EntityKind) -> &'static [FieldRule] {
    match kind {
        EntityKind::Book => BOOK_RULES,
        EntityKind::User => USER_RULES,
        EntityKind::CreditPackage => CREDIT_PACKAGE_RULES,
    }
}

/// Validates a form for the given entity kind.
///
/// Returns the typed fields to send to the service. The `id` field and any
/// field the kind does not define are dropped; identifiers are always assigned
/// by the service.
///
/// # Errors
///
/// Returns the first [`ValidationError`] in field declaration order.
pub fn validate(
    kind: EntityKind,
    form: &FormInput,
    intent: FormIntent,
) -> Result<Fields, ValidationError> {
    let _span = tracing::debug_span!("validate_form", kind = %kind, intent = ?intent, field_count = form.len()).entered();

    let mut fields = Fields::new();

    for rule in rules_for(kind) {
        let raw = form.get(rule.name).map(|v| v.trim());
        match raw {
            None | Some("") => {
                let demanded = match intent {
                    FormIntent::Create => true,
                    FormIntent::Update => raw.is_some(),
                };
                if rule.required && demanded {
                    return Err(ValidationError::new(rule.name, "is required"));
                }
                if raw.is_some() && rule.rule == Rule::Text {
                    fields.insert(rule.name.to_string(), Value::String(String::new()));
                }
            }
            Some(text) => {
                let value = parse(rule, text)?;
                fields.insert(rule.name.to_string(), value);
            }
        }
    }

    let ignored = form
        .keys()
        .filter(|key| key.as_str() == ID_FIELD || !rules_for(kind).iter().any(|r| r.name == key.as_str()))
        .count();
    if ignored > 0 {
        tracing::debug!(ignored, "dropped form fields not defined for this kind");
    }

    Ok(fields)
}

fn parse(rule: &FieldRule, text: &str) -> Result<Value, ValidationError> {
    let field = rule.name;
    match rule.rule {
        Rule::Text => Ok(Value::String(text.to_string())),
        Rule::Email => {
            if is_email(text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(ValidationError::new(field, "must be a valid email address"))
            }
        }
        Rule::NonNegativeInt => text
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| ValidationError::new(field, "must be a whole number of zero or more")),
        Rule::PositiveInt => match text.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Value::from(n)),
            _ => Err(ValidationError::new(field, "must be a whole number greater than zero")),
        },
        Rule::NonNegativeNumber => match text.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(json!(n)),
            _ => Err(ValidationError::new(field, "must be a number of zero or more")),
        },
        Rule::Rating => match text.parse::<f64>() {
            Ok(n) if (0.0..=5.0).contains(&n) => Ok(json!(n)),
            _ => Err(ValidationError::new(field, "must be a number between 0 and 5")),
        },
        Rule::Bool => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| ValidationError::new(field, "must be true or false")),
        Rule::Role => Ok(json!({ "name": text.to_ascii_lowercase() })),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormInput {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn book_create_requires_title_and_author() {
        let err = validate(EntityKind::Book, &form(&[("title", "Dune")]), FormIntent::Create)
            .unwrap_err();
        assert_eq!(err.field, "author");
    }

    #[test]
    fn book_fields_are_typed() {
        let fields = validate(
            EntityKind::Book,
            &form(&[
                ("title", " Dune "),
                ("author", "Herbert"),
                ("viewCount", "12"),
                ("rating", "4.5"),
                ("isPublished", "yes"),
            ]),
            FormIntent::Create,
        )
        .unwrap();
        assert_eq!(fields["title"], json!("Dune"));
        assert_eq!(fields["viewCount"], json!(12));
        assert_eq!(fields["rating"], json!(4.5));
        assert_eq!(fields["isPublished"], json!(true));
    }

    #[test]
    fn client_supplied_id_is_dropped() {
        let fields = validate(
            EntityKind::Book,
            &form(&[("id", "77"), ("title", "Dune"), ("author", "Herbert")]),
            FormIntent::Create,
        )
        .unwrap();
        assert!(!fields.contains_key("id"));
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let err = validate(
            EntityKind::Book,
            &form(&[("title", "Dune"), ("author", "Herbert"), ("rating", "7")]),
            FormIntent::Create,
        )
        .unwrap_err();
        assert_eq!(err.field, "rating");
    }

    #[test]
    fn user_email_format_is_checked() {
        for bad in ["nobody", "a@b", "a b@c.d", "@c.d", "a@@c.d", "a@c."] {
            let result = validate(
                EntityKind::User,
                &form(&[("name", "Ann"), ("email", bad)]),
                FormIntent::Create,
            );
            assert!(result.is_err(), "{bad} should be rejected");
        }
        let fields = validate(
            EntityKind::User,
            &form(&[("name", "Ann"), ("email", "ann@example.com"), ("role", "Admin")]),
            FormIntent::Create,
        )
        .unwrap();
        assert_eq!(fields["role"], json!({"name": "admin"}));
    }

    #[test]
    fn package_numbers_are_parsed() {
        let err = validate(
            EntityKind::CreditPackage,
            &form(&[("name", "Starter"), ("credits", "0"), ("price", "4.99")]),
            FormIntent::Create,
        )
        .unwrap_err();
        assert_eq!(err.field, "credits");

        let err = validate(
            EntityKind::CreditPackage,
            &form(&[("name", "Starter"), ("credits", "10"), ("price", "abc")]),
            FormIntent::Create,
        )
        .unwrap_err();
        assert_eq!(err.field, "price");

        let fields = validate(
            EntityKind::CreditPackage,
            &form(&[("name", "Starter"), ("credits", "10"), ("price", "4.99")]),
            FormIntent::Create,
        )
        .unwrap();
        assert_eq!(fields["credits"], json!(10));
        assert_eq!(fields["price"], json!(4.99));
    }

    #[test]
    fn partial_update_only_checks_present_fields() {
        let fields = validate(
            EntityKind::CreditPackage,
            &form(&[("price", "12")]),
            FormIntent::Update,
        )
        .unwrap();
        assert_eq!(fields.len(), 1);

        let err = validate(EntityKind::CreditPackage, &form(&[("name", "  ")]), FormIntent::Update)
            .unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn blank_optional_text_clears_the_field() {
        let fields = validate(
            EntityKind::Book,
            &form(&[("description", "")]),
            FormIntent::Update,
        )
        .unwrap();
        assert_eq!(fields["description"], json!(""));
    }
}
