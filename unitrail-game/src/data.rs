use crate::constants::REFERENCE_EXCERPT_LEN;
use serde::{Deserialize, Serialize};

/// Named flavor lists used by event messages and enhancement requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReferenceLists {
    pub classes: Vec<String>,
    pub foods: Vec<String>,
    pub hangouts: Vec<String>,
    pub study: Vec<String>,
    pub transport: Vec<String>,
}

impl ReferenceLists {
    /// Create empty reference lists (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load reference lists from a JSON string.
    ///
    /// Entries are trimmed and blank entries dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into reference lists.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(json)?;
        Ok(parsed.normalized())
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            classes: normalize(self.classes),
            foods: normalize(self.foods),
            hangouts: normalize(self.hangouts),
            study: normalize(self.study),
            transport: normalize(self.transport),
        }
    }

    /// Copy with every list cut to the excerpt length sent to external services.
    #[must_use]
    pub fn excerpt(&self) -> Self {
        let cut = |list: &[String]| list.iter().take(REFERENCE_EXCERPT_LEN).cloned().collect();
        Self {
            classes: cut(&self.classes),
            foods: cut(&self.foods),
            hangouts: cut(&self.hangouts),
            study: cut(&self.study),
            transport: cut(&self.transport),
        }
    }
}

fn normalize(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}
