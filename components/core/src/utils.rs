use convert_case::Case;
use convert_case::Casing;

use crate::id::Identifier;

pub fn format_id(base_name: &Identifier, id: &Option<Identifier>, key: &str) -> Identifier {
    id.clone().unwrap_or_else(|| {
        Identifier::generated(format!("{}_{}", base_name, key.to_case(Case::Snake)))
    })
}

pub fn default_name(key: &str) -> String {
    key.to_case(Case::Title)
}
