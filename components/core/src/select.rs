use serde::Serialize;

use crate::entity::{enum_error, Constraints, EntitySlot};
use crate::error::{ValidationError, ValidationResult};
use crate::fields::Fields;

/// Options are per instance: a configured `options` list narrows the slot
/// vocabulary and becomes the only domain this instance accepts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectTraits {
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_option: Option<String>,
}

impl SelectTraits {
    pub fn accepts(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

pub(crate) fn validate(fields: &mut Fields, slot: &EntitySlot) -> ValidationResult<SelectTraits> {
    let vocabulary: &[&str] = match slot.constraints {
        Constraints::Select { options } => options,
        _ => &[],
    };

    let options = match fields.string_list("options")? {
        Some(options) => {
            if options.is_empty() {
                return Err(ValidationError::TypeMismatch {
                    path: fields.child_path("options"),
                    expected: "a non-empty list of options",
                });
            }
            if let Some(unknown) = options.iter().find(|o| !vocabulary.contains(&o.as_str())) {
                return Err(enum_error(
                    fields.child_path("options"),
                    unknown.clone(),
                    vocabulary,
                ));
            }
            options
        }
        None => vocabulary.iter().map(|o| o.to_string()).collect(),
    };

    let initial_option = match fields.string("initial_option")? {
        Some(value) if options.contains(&value) => Some(value),
        Some(value) => {
            let allowed: Vec<&str> = options.iter().map(String::as_str).collect();
            return Err(enum_error(
                fields.child_path("initial_option"),
                value,
                &allowed,
            ));
        }
        None => None,
    };

    Ok(SelectTraits {
        options,
        initial_option,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    static MODE: EntitySlot =
        EntitySlot::optional("mode", EntityKind::Select).with_constraints(Constraints::Select {
            options: &["NONE", "wifi0", "wifi1", "mode0"],
        });

    fn traits(yaml: &str) -> ValidationResult<SelectTraits> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let mut fields = Fields::new("mode", &raw)?;
        validate(&mut fields, &MODE)
    }

    #[test]
    fn defaults_to_the_full_vocabulary() {
        let select = traits("{}").unwrap();
        assert_eq!(select.options, vec!["NONE", "wifi0", "wifi1", "mode0"]);
        assert!(select.accepts("mode0"));
    }

    #[test]
    fn instance_list_narrows_the_domain() {
        let select = traits("options: [wifi0, wifi1]\ninitial_option: wifi1").unwrap();
        assert_eq!(select.options, vec!["wifi0", "wifi1"]);
        assert!(!select.accepts("NONE"));
        assert_eq!(select.initial_option.as_deref(), Some("wifi1"));
    }

    #[test]
    fn options_outside_the_vocabulary_are_rejected() {
        let err = traits("options: [wifi0, wifi4]").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownEnumValue {
                path: "mode.options".to_string(),
                value: "wifi4".to_string(),
                allowed: vec![
                    "NONE".to_string(),
                    "wifi0".to_string(),
                    "wifi1".to_string(),
                    "mode0".to_string()
                ],
            }
        );
    }

    #[test]
    fn initial_option_must_be_in_the_narrowed_domain() {
        assert!(matches!(
            traits("options: [wifi0]\ninitial_option: NONE"),
            Err(ValidationError::UnknownEnumValue { .. })
        ));
        assert!(matches!(
            traits("options: []"),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}
