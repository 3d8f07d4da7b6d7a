//! Structured medicine suggestion returned in constrained-output mode.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::DecodeError;

/// Dosage text the model must use for prescription-only guidance
pub const PRESCRIPTION_SENTINEL: &str = "PRESCRIPTION REQUIRED - Consult Physician for Dosage";

/// Substring that selects the prescription presentation
pub const PRESCRIPTION_MARKER: &str = "PRESCRIPTION REQUIRED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSuggestion {
    pub medicine_name: String,
    pub purpose: String,
    pub dosage: String,
    pub warning: String,
}

impl MedicineSuggestion {
    /// Decodes model output, rejecting anything that is not the full four-field shape.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let suggestion: Self = serde_json::from_str(text)?;
        suggestion.validate()?;
        Ok(suggestion)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        let fields = [
            ("medicineName", &self.medicine_name),
            ("purpose", &self.purpose),
            ("dosage", &self.dosage),
            ("warning", &self.warning),
        ];

        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(DecodeError::EmptyField(name)),
            None => Ok(()),
        }
    }

    /// Compact JSON form kept in the transcript and replayed to the API
    pub fn to_canonical_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_prescription(&self) -> bool {
        self.dosage.contains(PRESCRIPTION_MARKER)
    }
}

/// Response schema sent with structured requests
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "medicineName": {
                "type": "STRING",
                "description": "The common name of the non-prescription, over-the-counter medicine suggested (e.g., Ibuprofen, Antacid). For complex issues like diabetes, use the common drug class (e.g., ACE Inhibitors, Metformin) and state 'Prescription Required' in the dosage field."
            },
            "purpose": {
                "type": "STRING",
                "description": "What this medicine is typically used for (e.g., pain relief, fever reduction, allergy, or managing high blood pressure)."
            },
            "dosage": {
                "type": "STRING",
                "description": format!("Typical adult dosage instructions (e.g., 'One 500mg tablet every 4-6 hours'). If it is a prescription drug, this MUST state '{}'.", PRESCRIPTION_SENTINEL)
            },
            "warning": {
                "type": "STRING",
                "description": "A MANDATORY concise safety reminder about usage or contraindications. Example: 'Do not exceed daily limit.' or 'Not suitable for children.'"
            }
        },
        "required": ["medicineName", "purpose", "dosage", "warning"]
    })
}
