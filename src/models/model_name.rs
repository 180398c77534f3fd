use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::ClosedEnum;

/// The machine learning models the API knows about
///
/// Wire values are the lowercase variant names and are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Alexnet,
    Resnet,
    Lenet,
}

impl ModelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Alexnet => "alexnet",
            ModelName::Resnet => "resnet",
            ModelName::Lenet => "lenet",
        }
    }

    /// The blurb returned alongside the model name
    pub fn message(&self) -> &'static str {
        match self {
            // The misspelling is part of the public response
            ModelName::Alexnet => "Deep learnign FTW!",
            ModelName::Lenet => "LeCNN all the images",
            ModelName::Resnet => "Have some residuals",
        }
    }
}

impl ClosedEnum for ModelName {
    const NAME: &'static str = "ModelName";
    const VARIANTS: &'static [&'static str] = &["alexnet", "resnet", "lenet"];
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_match_serde_names() {
        for model in [ModelName::Alexnet, ModelName::Resnet, ModelName::Lenet] {
            let wire = serde_json::to_value(model).unwrap();
            assert_eq!(wire, serde_json::Value::String(model.as_str().to_string()));
            assert!(ModelName::VARIANTS.contains(&model.as_str()));
        }
    }

    #[test]
    fn test_deserialize_is_case_sensitive() {
        assert!(serde_json::from_str::<ModelName>("\"Alexnet\"").is_err());
        assert_eq!(serde_json::from_str::<ModelName>("\"resnet\"").unwrap(), ModelName::Resnet);
    }
}
