use std::collections::HashSet;

use crate::domain::{
    error::DomainError,
    model::{EntityConfig, EntityModel},
};

/// Field names every record declares itself.
const RESERVED_FIELDS: &[&str] = &["id"];

/// Centralized entity model validation.
///
/// Runs once before generation; the first violation wins.
pub struct ModelValidator;

impl ModelValidator {
    pub fn validate(model: &EntityModel) -> Result<(), DomainError> {
        validate_module(&model.application.module)?;

        let mut names = HashSet::new();
        for entity in &model.entities {
            validate_identifier("entity", &entity.name)?;
            if !names.insert(entity.name.as_str()) {
                return Err(DomainError::DuplicateEntity {
                    name: entity.name.clone(),
                });
            }
        }

        for entity in &model.entities {
            Self::validate_entity(entity, &names)?;
        }
        Ok(())
    }

    fn validate_entity(entity: &EntityConfig, known: &HashSet<&str>) -> Result<(), DomainError> {
        if entity.fields.is_empty() {
            return Err(DomainError::NoFields {
                entity: entity.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for field in &entity.fields {
            validate_identifier("field", &field.name)?;
            if RESERVED_FIELDS.contains(&field.name.to_ascii_lowercase().as_str()) {
                return Err(DomainError::ReservedField {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::DuplicateField {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Some(target) = field.ty.referenced_entity() {
                if !known.contains(target) {
                    return Err(DomainError::UnknownReference {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_module(module: &str) -> Result<(), DomainError> {
    let module = module.trim();
    if module.is_empty() {
        return Err(DomainError::EmptyModule);
    }
    let invalid = |reason: &str| DomainError::InvalidModule {
        module: module.to_string(),
        reason: reason.to_string(),
    };
    if module.chars().any(char::is_whitespace) {
        return Err(invalid("whitespace is not allowed"));
    }
    if module.trim_end_matches('/').split('/').any(str::is_empty) {
        return Err(invalid("empty path segment"));
    }
    Ok(())
}

/// Exported Go identifier: uppercase ASCII letter, then letters, digits, `_`.
fn validate_identifier(what: &'static str, name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidIdentifier {
        what,
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let mut chars = name.chars();
    match chars.next() {
        None => Err(invalid("name is empty")),
        Some(first) if !first.is_ascii_uppercase() => {
            Err(invalid("must start with an uppercase letter"))
        }
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Err(invalid("only ASCII letters, digits and '_' are allowed"))
        }
        Some(_) => Ok(()),
    }
}
