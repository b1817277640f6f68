use std::fmt;
use std::fmt::Debug;
use std::io;
use std::io::Write;
use crate::common::MaskRcnnConfig;

/// Width the setting names are padded to in the dump.
pub const NAME_WIDTH: usize = 30;

type Accessor = fn(&MaskRcnnConfig) -> Option<String>;

// Sorted by name. An accessor returning None marks a callable setting,
// which is left out of the dump.
const FIELDS: [(&str, Accessor); 48] = [
    ("BACKBONE", |c| Some(c.settings().backbone.name().to_string())),
    ("BACKBONE_STRIDES", |c| Some(format!("{:?}", c.settings().backbone_strides))),
    ("BATCH_SIZE", |c| Some(c.batch_size().to_string())),
    ("BBOX_STD_DEV", |c| Some(c.settings().bbox_std_dev.to_string())),
    ("COMPUTE_BACKBONE_SHAPE", |c| match c.settings().compute_backbone_shape {
        Some(_) => None,
        None => Some(none()),
    }),
    ("DETECTION_MAX_INSTANCES", |c| Some(c.settings().detection_max_instances.to_string())),
    ("DETECTION_MIN_CONFIDENCE", |c| Some(float(c.settings().detection_min_confidence))),
    ("DETECTION_NMS_THRESHOLD", |c| Some(float(c.settings().detection_nms_threshold))),
    ("FPN_CLASSIF_FC_LAYERS_SIZE", |c| Some(c.settings().fpn_classif_fc_layers_size.to_string())),
    ("GPU_COUNT", |c| Some(c.settings().gpu_count.to_string())),
    ("GRADIENT_CLIP_NORM", |c| Some(float(c.settings().gradient_clip_norm))),
    ("IMAGES_PER_GPU", |c| Some(c.settings().images_per_gpu.to_string())),
    ("IMAGE_CHANNEL_COUNT", |c| Some(c.settings().image_channel_count.to_string())),
    ("IMAGE_MAX_DIM", |c| Some(c.settings().image_max_dim.to_string())),
    ("IMAGE_META_SIZE", |c| Some(c.image_meta_size().to_string())),
    ("IMAGE_MIN_DIM", |c| Some(c.settings().image_min_dim.to_string())),
    ("IMAGE_MIN_SCALE", |c| Some(float(c.settings().image_min_scale))),
    ("IMAGE_RESIZE_MODE", |c| Some(c.settings().image_resize_mode.str_lowercase().to_string())),
    ("IMAGE_SHAPE", |c| Some(c.image_shape().to_string())),
    ("LEARNING_MOMENTUM", |c| Some(float(c.settings().learning_momentum))),
    ("LEARNING_RATE", |c| Some(float(c.settings().learning_rate))),
    ("LOSS_WEIGHTS", |c| Some(c.settings().loss_weights.to_string())),
    ("MASK_POOL_SIZE", |c| Some(c.settings().mask_pool_size.to_string())),
    ("MASK_SHAPE", |c| Some(format!("{:?}", c.settings().mask_shape))),
    ("MAX_GT_INSTANCES", |c| Some(c.settings().max_gt_instances.to_string())),
    ("MEAN_PIXEL", |c| Some(c.settings().mean_pixel.to_string())),
    ("MINI_MASK_SHAPE", |c| Some(format!("{:?}", c.settings().mini_mask_shape))),
    ("NAME", |c| Some(c.name().map(str::to_string).unwrap_or_else(none))),
    ("NUM_CLASSES", |c| Some(c.settings().num_classes.to_string())),
    ("POOL_SIZE", |c| Some(c.settings().pool_size.to_string())),
    ("POST_NMS_ROIS_INFERENCE", |c| Some(c.settings().post_nms_rois_inference.to_string())),
    ("POST_NMS_ROIS_TRAINING", |c| Some(c.settings().post_nms_rois_training.to_string())),
    ("PRE_NMS_LIMIT", |c| Some(c.settings().pre_nms_limit.to_string())),
    ("ROI_POSITIVE_RATIO", |c| Some(float(c.settings().roi_positive_ratio))),
    ("RPN_ANCHOR_RATIOS", |c| Some(format!("{:?}", c.settings().rpn_anchor_ratios))),
    ("RPN_ANCHOR_SCALES", |c| Some(tuple(&c.settings().rpn_anchor_scales))),
    ("RPN_ANCHOR_STRIDE", |c| Some(c.settings().rpn_anchor_stride.to_string())),
    ("RPN_BBOX_STD_DEV", |c| Some(c.settings().rpn_bbox_std_dev.to_string())),
    ("RPN_NMS_THRESHOLD", |c| Some(float(c.settings().rpn_nms_threshold))),
    ("RPN_TRAIN_ANCHORS_PER_IMAGE", |c| Some(c.settings().rpn_train_anchors_per_image.to_string())),
    ("STEPS_PER_EPOCH", |c| Some(c.settings().steps_per_epoch.to_string())),
    ("TOP_DOWN_PYRAMID_SIZE", |c| Some(c.settings().top_down_pyramid_size.to_string())),
    ("TRAIN_BN", |c| Some(c.settings().train_bn.map(|x| x.to_string()).unwrap_or_else(none))),
    ("TRAIN_ROIS_PER_IMAGE", |c| Some(c.settings().train_rois_per_image.to_string())),
    ("USE_MINI_MASK", |c| Some(c.settings().use_mini_mask.to_string())),
    ("USE_RPN_ROIS", |c| Some(c.settings().use_rpn_rois.to_string())),
    ("VALIDATION_STEPS", |c| Some(c.settings().validation_steps.to_string())),
    ("WEIGHT_DECAY", |c| Some(float(c.settings().weight_decay))),
];

fn none() -> String {
    "None".to_string()
}

// Debug keeps the trailing ".0" on whole numbers.
fn float(x: f32) -> String {
    format!("{:?}", x)
}

fn tuple<T: Debug>(items: &[T]) -> String {
    let inner = items.iter().map(|x| format!("{:?}", x)).collect::<Vec<String>>().join(", ");
    format!("({})", inner)
}

impl MaskRcnnConfig {
    /// Names of every setting the dump can contain, in dump order.
    pub fn field_names() -> Vec<&'static str> {
        FIELDS.iter().map(|(name, _)| *name).collect()
    }

    /// One `(name, value)` pair per displayed setting, in dump order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        FIELDS.iter()
            .filter_map(|(name, accessor)| accessor(self).map(|value| (*name, value)))
            .collect()
    }

    pub fn write_display<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nConfigurations:")?;
        for (name, value) in self.entries() {
            writeln!(out, "{:width$} {}", name, value, width = NAME_WIDTH)?;
        }
        writeln!(out, "\n")
    }

    /// Prints every setting to stdout.
    pub fn display(&self) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = self.write_display(&mut handle) {
            log::warn!("Failed to display configuration: {}", e);
        }
    }
}

impl fmt::Display for MaskRcnnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{:width$} {}", name, value, width = NAME_WIDTH)?;
        }
        Ok(())
    }
}
