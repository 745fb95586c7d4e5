use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Which scraped columns feed the engine.
///
/// Only the two code columns are required to exist in the scrapes; the
/// descriptive columns default to empty when the page layout drifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Full-universe column holding the raw stock label.
    pub full_code: String,
    pub full_display_name: String,
    pub full_sector: String,
    /// Restricted-universe column holding the raw stock label.
    pub restricted_code: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            full_code: "Kod".into(),
            full_display_name: "Hisse Adı".into(),
            full_sector: "Sektör".into(),
            restricted_code: "Hisseler".into(),
        }
    }
}

impl ColumnMapping {
    pub fn validate(&self) -> Result<(), ReconError> {
        let named = [
            ("full_code", &self.full_code),
            ("full_display_name", &self.full_display_name),
            ("full_sector", &self.full_sector),
            ("restricted_code", &self.restricted_code),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "column '{key}' must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
