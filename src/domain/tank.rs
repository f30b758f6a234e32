// Tank domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tank {
    pub id: String,
    pub name: String,
}

impl Tank {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // "Grow_Bed_1_" -> "Grow Bed 1"
        id.trim_end_matches('_').replace('_', " ")
    }
}
