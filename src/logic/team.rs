// Teams as far as the engine is concerned: an identifier and a name.
use serde::{Deserialize, Serialize};

use crate::logic::types::TeamId;

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
#[derive(PartialEq, Eq, Hash)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

impl TeamRef {
    pub fn build(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}
