use serde::{Deserialize, Serialize};

// Possibly extend this with the feature-pyramid variants once they're needed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backbone {
    ResNet50,
    #[default] ResNet101,
}

impl Backbone {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResNet50 => "resnet50",
            Self::ResNet101 => "resnet101",
        }
    }

    pub fn from_str(backbone: &str) -> Option<Self> {
        match backbone.to_lowercase().as_str() {
            "resnet50" => Some(Backbone::ResNet50),
            "resnet101" => Some(Backbone::ResNet101),
            _ => None,
        }
    }
}
