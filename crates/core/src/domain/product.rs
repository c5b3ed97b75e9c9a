use serde::{Deserialize, Serialize};

use crate::domain::tag::TagGroups;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub tags: TagGroups,
}

impl Product {
    pub fn new(name: impl Into<String>, tags: TagGroups) -> Self {
        Self { name: name.into(), tags }
    }
}
