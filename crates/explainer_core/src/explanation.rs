use serde_json::{Map, Value};

const FIELD_SEPARATOR: &str = "<br/><br/>";

/// Named sections of a model explanation, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplanationField {
    DirectExplanation,
    SimpleAnalogy,
    Etymology,
    Mnemonic,
}

impl ExplanationField {
    /// Fields that must all be present and non-empty for a response to count.
    pub const REQUIRED: [ExplanationField; 3] = [
        ExplanationField::DirectExplanation,
        ExplanationField::SimpleAnalogy,
        ExplanationField::Etymology,
    ];

    /// JSON key the model is asked to use.
    pub fn key(self) -> &'static str {
        match self {
            ExplanationField::DirectExplanation => "direct_explanation",
            ExplanationField::SimpleAnalogy => "simple_analogy",
            ExplanationField::Etymology => "etymology",
            ExplanationField::Mnemonic => "mnemonic",
        }
    }

    /// Bold heading rendered in front of the field.
    pub fn label(self) -> &'static str {
        match self {
            ExplanationField::DirectExplanation => "Direct Explanation",
            ExplanationField::SimpleAnalogy => "Simple Analogy",
            ExplanationField::Etymology => "Etymology",
            ExplanationField::Mnemonic => "Mnemonic",
        }
    }
}

/// A validated explanation. Every required field holds non-empty HTML-bearing prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredExplanation {
    pub direct_explanation: String,
    pub simple_analogy: String,
    pub etymology: String,
    pub mnemonic: Option<String>,
}

impl StructuredExplanation {
    /// Present fields paired with their text, in display order.
    pub fn fields(&self) -> impl Iterator<Item = (ExplanationField, &str)> {
        [
            (
                ExplanationField::DirectExplanation,
                Some(self.direct_explanation.as_str()),
            ),
            (
                ExplanationField::SimpleAnalogy,
                Some(self.simple_analogy.as_str()),
            ),
            (ExplanationField::Etymology, Some(self.etymology.as_str())),
            (ExplanationField::Mnemonic, self.mnemonic.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, text)| text.map(|text| (field, text)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplanationError {
    /// No decodable JSON object in the model output.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// A JSON object was found but required fields are missing or empty.
    #[error("invalid explanation, missing {}", missing_keys(.missing))]
    Invalid { missing: Vec<ExplanationField> },
}

fn missing_keys(missing: &[ExplanationField]) -> String {
    missing
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extract the explanation object from raw model output.
///
/// The model tends to wrap its JSON in prose, so everything from the first `{`
/// to the last `}` is decoded as a single object. Braces inside a broken body
/// are not balanced.
pub fn parse_explanation(raw: &str) -> Result<StructuredExplanation, ExplanationError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ExplanationError::Malformed(
            "no JSON object found".to_string(),
        ));
    };
    if end < start {
        return Err(ExplanationError::Malformed(
            "no JSON object found".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(&raw[start..=end])
        .map_err(|err| ExplanationError::Malformed(err.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ExplanationError::Malformed(
            "JSON body is not an object".to_string(),
        ));
    };

    let direct = text_field(&object, ExplanationField::DirectExplanation);
    let analogy = text_field(&object, ExplanationField::SimpleAnalogy);
    let etymology = text_field(&object, ExplanationField::Etymology);

    match (direct, analogy, etymology) {
        (Some(direct_explanation), Some(simple_analogy), Some(etymology)) => {
            Ok(StructuredExplanation {
                direct_explanation,
                simple_analogy,
                etymology,
                mnemonic: text_field(&object, ExplanationField::Mnemonic),
            })
        }
        _ => Err(ExplanationError::Invalid {
            missing: ExplanationField::REQUIRED
                .into_iter()
                .filter(|field| text_field(&object, *field).is_none())
                .collect(),
        }),
    }
}

fn text_field(object: &Map<String, Value>, field: ExplanationField) -> Option<String> {
    object
        .get(field.key())
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Render as `<b>Label:</b><br/><br/>text` blocks separated by a blank line break.
pub fn format_explanation(explanation: &StructuredExplanation) -> String {
    explanation
        .fields()
        .map(|(field, text)| format!("<b>{}:</b>{FIELD_SEPARATOR}{text}", field.label()))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}
