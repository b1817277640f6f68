use std::fmt;
use serde::{Deserialize, Serialize};

pub const RPN_CLASS_LOSS: &str = "rpn_class_loss";
pub const RPN_BBOX_LOSS: &str = "rpn_bbox_loss";
pub const MRCNN_CLASS_LOSS: &str = "mrcnn_class_loss";
pub const MRCNN_BBOX_LOSS: &str = "mrcnn_bbox_loss";
pub const MRCNN_MASK_LOSS: &str = "mrcnn_mask_loss";

/// The five loss names, in the order they are reported.
pub const LOSS_NAMES: [&str; 5] = [
    RPN_CLASS_LOSS,
    RPN_BBOX_LOSS,
    MRCNN_CLASS_LOSS,
    MRCNN_BBOX_LOSS,
    MRCNN_MASK_LOSS,
];

/// Relative weight of each loss term. The key set is fixed, so this is a
/// struct rather than a map; the JSON form is still an object keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossWeights {
    pub rpn_class_loss: f32,
    pub rpn_bbox_loss: f32,
    pub mrcnn_class_loss: f32,
    pub mrcnn_bbox_loss: f32,
    pub mrcnn_mask_loss: f32,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self {
            rpn_class_loss: 1.0,
            rpn_bbox_loss: 1.0,
            mrcnn_class_loss: 1.0,
            mrcnn_bbox_loss: 1.0,
            mrcnn_mask_loss: 1.0,
        }
    }
}

impl LossWeights {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_weight(mut self, name: &str, weight: f32) -> Option<Self> {
        *self.get_mut(name)? = weight;
        Some(self)
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        match name {
            RPN_CLASS_LOSS => Some(self.rpn_class_loss),
            RPN_BBOX_LOSS => Some(self.rpn_bbox_loss),
            MRCNN_CLASS_LOSS => Some(self.mrcnn_class_loss),
            MRCNN_BBOX_LOSS => Some(self.mrcnn_bbox_loss),
            MRCNN_MASK_LOSS => Some(self.mrcnn_mask_loss),
            _ => None,
        }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut f32> {
        match name {
            RPN_CLASS_LOSS => Some(&mut self.rpn_class_loss),
            RPN_BBOX_LOSS => Some(&mut self.rpn_bbox_loss),
            MRCNN_CLASS_LOSS => Some(&mut self.mrcnn_class_loss),
            MRCNN_BBOX_LOSS => Some(&mut self.mrcnn_bbox_loss),
            MRCNN_MASK_LOSS => Some(&mut self.mrcnn_mask_loss),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        LOSS_NAMES.iter().map(move |name| (*name, self.get(name).unwrap_or_default()))
    }
}

impl fmt::Display for LossWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, weight)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {:?}", name, weight)?;
        }
        write!(f, "}}")
    }
}
