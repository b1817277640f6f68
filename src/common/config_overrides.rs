use std::path::Path;
use anyhow::Context;
use ndarray::Array1;
use serde::{Deserialize, Deserializer};
use crate::common::{Backbone, BackboneShapeFn, BaseConfig, ImageResizeMode, LossWeights};
use crate::data::FsAccess;

/// Sub-directory of the bvr config dir holding named override files.
pub const OVERRIDES_DIR: &str = "mask_rcnn";

/// A partial configuration. Every field left as `None` keeps the value of
/// the base it is applied to.
///
/// The JSON form uses the display names (`NUM_CLASSES`, `IMAGE_RESIZE_MODE`,
/// ...). Derived values like `BATCH_SIZE` are not settable and are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub gpu_count: Option<usize>,
    pub images_per_gpu: Option<usize>,
    pub steps_per_epoch: Option<usize>,
    pub validation_steps: Option<usize>,
    pub backbone: Option<Backbone>,
    #[serde(skip)]
    pub compute_backbone_shape: Option<BackboneShapeFn>,
    pub backbone_strides: Option<Vec<u32>>,
    pub fpn_classif_fc_layers_size: Option<usize>,
    pub top_down_pyramid_size: Option<usize>,
    pub num_classes: Option<usize>,
    pub rpn_anchor_scales: Option<[u32; 5]>,
    pub rpn_anchor_ratios: Option<Vec<f32>>,
    pub rpn_anchor_stride: Option<usize>,
    pub rpn_nms_threshold: Option<f32>,
    pub rpn_train_anchors_per_image: Option<usize>,
    pub pre_nms_limit: Option<usize>,
    pub post_nms_rois_training: Option<usize>,
    pub post_nms_rois_inference: Option<usize>,
    pub use_mini_mask: Option<bool>,
    pub mini_mask_shape: Option<(u32, u32)>,
    pub image_resize_mode: Option<ImageResizeMode>,
    pub image_min_dim: Option<u32>,
    pub image_max_dim: Option<u32>,
    pub image_min_scale: Option<f32>,
    pub image_channel_count: Option<u32>,
    pub mean_pixel: Option<Vec<f32>>,
    pub train_rois_per_image: Option<usize>,
    pub roi_positive_ratio: Option<f32>,
    pub pool_size: Option<usize>,
    pub mask_pool_size: Option<usize>,
    pub mask_shape: Option<[u32; 2]>,
    pub max_gt_instances: Option<usize>,
    pub rpn_bbox_std_dev: Option<Vec<f32>>,
    pub bbox_std_dev: Option<Vec<f32>>,
    pub detection_max_instances: Option<usize>,
    pub detection_min_confidence: Option<f32>,
    pub detection_nms_threshold: Option<f32>,
    pub learning_rate: Option<f32>,
    pub learning_momentum: Option<f32>,
    pub weight_decay: Option<f32>,
    pub loss_weights: Option<LossWeights>,
    pub use_rpn_rois: Option<bool>,
    #[serde(deserialize_with = "present_or_null")]
    pub train_bn: Option<Option<bool>>,
    pub gradient_clip_norm: Option<f32>,
}

// Keeps an explicit `null` apart from a missing key.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let overrides = serde_json::from_str(json)?;
        Ok(overrides)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config overrides from {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config overrides in {}", path.display()))
    }

    /// Loads `<dir>/<variant>.json`.
    pub fn from_dir<P: AsRef<Path>>(dir: P, variant: &str) -> anyhow::Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", variant));
        log::info!("Loading config overrides for variant '{}' from {}", variant, path.display());
        Self::from_json_file(path)
    }

    /// Loads `<config dir>/bvr/mask_rcnn/<variant>.json`. Reading never creates the directory.
    pub fn from_config_dir(variant: &str) -> anyhow::Result<Self> {
        Self::from_dir(FsAccess::Config.path_with_subs(&[OVERRIDES_DIR])?, variant)
    }

    pub fn with_name(mut self, x: &str) -> Self {
        self.name = Some(x.to_string());
        self
    }

    pub fn with_gpu_count(mut self, x: usize) -> Self {
        self.gpu_count = Some(x);
        self
    }

    pub fn with_images_per_gpu(mut self, x: usize) -> Self {
        self.images_per_gpu = Some(x);
        self
    }

    pub fn with_steps_per_epoch(mut self, x: usize) -> Self {
        self.steps_per_epoch = Some(x);
        self
    }

    pub fn with_validation_steps(mut self, x: usize) -> Self {
        self.validation_steps = Some(x);
        self
    }

    pub fn with_backbone(mut self, x: Backbone) -> Self {
        self.backbone = Some(x);
        self
    }

    pub fn with_compute_backbone_shape(mut self, x: BackboneShapeFn) -> Self {
        self.compute_backbone_shape = Some(x);
        self
    }

    pub fn with_backbone_strides(mut self, x: &[u32]) -> Self {
        self.backbone_strides = Some(x.to_vec());
        self
    }

    pub fn with_fpn_classif_fc_layers_size(mut self, x: usize) -> Self {
        self.fpn_classif_fc_layers_size = Some(x);
        self
    }

    pub fn with_top_down_pyramid_size(mut self, x: usize) -> Self {
        self.top_down_pyramid_size = Some(x);
        self
    }

    pub fn with_num_classes(mut self, x: usize) -> Self {
        self.num_classes = Some(x);
        self
    }

    pub fn with_rpn_anchor_scales(mut self, x: [u32; 5]) -> Self {
        self.rpn_anchor_scales = Some(x);
        self
    }

    pub fn with_rpn_anchor_ratios(mut self, x: &[f32]) -> Self {
        self.rpn_anchor_ratios = Some(x.to_vec());
        self
    }

    pub fn with_rpn_anchor_stride(mut self, x: usize) -> Self {
        self.rpn_anchor_stride = Some(x);
        self
    }

    pub fn with_rpn_nms_threshold(mut self, x: f32) -> Self {
        self.rpn_nms_threshold = Some(x);
        self
    }

    pub fn with_rpn_train_anchors_per_image(mut self, x: usize) -> Self {
        self.rpn_train_anchors_per_image = Some(x);
        self
    }

    pub fn with_pre_nms_limit(mut self, x: usize) -> Self {
        self.pre_nms_limit = Some(x);
        self
    }

    pub fn with_post_nms_rois_training(mut self, x: usize) -> Self {
        self.post_nms_rois_training = Some(x);
        self
    }

    pub fn with_post_nms_rois_inference(mut self, x: usize) -> Self {
        self.post_nms_rois_inference = Some(x);
        self
    }

    pub fn with_use_mini_mask(mut self, x: bool) -> Self {
        self.use_mini_mask = Some(x);
        self
    }

    pub fn with_mini_mask_shape(mut self, x: (u32, u32)) -> Self {
        self.mini_mask_shape = Some(x);
        self
    }

    pub fn with_image_resize_mode(mut self, x: ImageResizeMode) -> Self {
        self.image_resize_mode = Some(x);
        self
    }

    pub fn with_image_min_dim(mut self, x: u32) -> Self {
        self.image_min_dim = Some(x);
        self
    }

    pub fn with_image_max_dim(mut self, x: u32) -> Self {
        self.image_max_dim = Some(x);
        self
    }

    pub fn with_image_min_scale(mut self, x: f32) -> Self {
        self.image_min_scale = Some(x);
        self
    }

    pub fn with_image_channel_count(mut self, x: u32) -> Self {
        self.image_channel_count = Some(x);
        self
    }

    pub fn with_mean_pixel(mut self, x: &[f32]) -> Self {
        self.mean_pixel = Some(x.to_vec());
        self
    }

    pub fn with_train_rois_per_image(mut self, x: usize) -> Self {
        self.train_rois_per_image = Some(x);
        self
    }

    pub fn with_roi_positive_ratio(mut self, x: f32) -> Self {
        self.roi_positive_ratio = Some(x);
        self
    }

    pub fn with_pool_size(mut self, x: usize) -> Self {
        self.pool_size = Some(x);
        self
    }

    pub fn with_mask_pool_size(mut self, x: usize) -> Self {
        self.mask_pool_size = Some(x);
        self
    }

    pub fn with_mask_shape(mut self, x: [u32; 2]) -> Self {
        self.mask_shape = Some(x);
        self
    }

    pub fn with_max_gt_instances(mut self, x: usize) -> Self {
        self.max_gt_instances = Some(x);
        self
    }

    pub fn with_rpn_bbox_std_dev(mut self, x: &[f32]) -> Self {
        self.rpn_bbox_std_dev = Some(x.to_vec());
        self
    }

    pub fn with_bbox_std_dev(mut self, x: &[f32]) -> Self {
        self.bbox_std_dev = Some(x.to_vec());
        self
    }

    pub fn with_detection_max_instances(mut self, x: usize) -> Self {
        self.detection_max_instances = Some(x);
        self
    }

    pub fn with_detection_min_confidence(mut self, x: f32) -> Self {
        self.detection_min_confidence = Some(x);
        self
    }

    pub fn with_detection_nms_threshold(mut self, x: f32) -> Self {
        self.detection_nms_threshold = Some(x);
        self
    }

    pub fn with_learning_rate(mut self, x: f32) -> Self {
        self.learning_rate = Some(x);
        self
    }

    pub fn with_learning_momentum(mut self, x: f32) -> Self {
        self.learning_momentum = Some(x);
        self
    }

    pub fn with_weight_decay(mut self, x: f32) -> Self {
        self.weight_decay = Some(x);
        self
    }

    pub fn with_loss_weights(mut self, x: LossWeights) -> Self {
        self.loss_weights = Some(x);
        self
    }

    pub fn with_use_rpn_rois(mut self, x: bool) -> Self {
        self.use_rpn_rois = Some(x);
        self
    }

    pub fn with_train_bn(mut self, x: Option<bool>) -> Self {
        self.train_bn = Some(x);
        self
    }

    pub fn with_gradient_clip_norm(mut self, x: f32) -> Self {
        self.gradient_clip_norm = Some(x);
        self
    }

    /// Writes every set field over `base`.
    pub fn apply(self, mut base: BaseConfig) -> BaseConfig {
        if let Some(x) = self.name {
            base.name = Some(x);
        }
        if let Some(x) = self.gpu_count {
            base.gpu_count = x;
        }
        if let Some(x) = self.images_per_gpu {
            base.images_per_gpu = x;
        }
        if let Some(x) = self.steps_per_epoch {
            base.steps_per_epoch = x;
        }
        if let Some(x) = self.validation_steps {
            base.validation_steps = x;
        }
        if let Some(x) = self.backbone {
            base.backbone = x;
        }
        if let Some(x) = self.compute_backbone_shape {
            base.compute_backbone_shape = Some(x);
        }
        if let Some(x) = self.backbone_strides {
            base.backbone_strides = x;
        }
        if let Some(x) = self.fpn_classif_fc_layers_size {
            base.fpn_classif_fc_layers_size = x;
        }
        if let Some(x) = self.top_down_pyramid_size {
            base.top_down_pyramid_size = x;
        }
        if let Some(x) = self.num_classes {
            base.num_classes = x;
        }
        if let Some(x) = self.rpn_anchor_scales {
            base.rpn_anchor_scales = x;
        }
        if let Some(x) = self.rpn_anchor_ratios {
            base.rpn_anchor_ratios = x;
        }
        if let Some(x) = self.rpn_anchor_stride {
            base.rpn_anchor_stride = x;
        }
        if let Some(x) = self.rpn_nms_threshold {
            base.rpn_nms_threshold = x;
        }
        if let Some(x) = self.rpn_train_anchors_per_image {
            base.rpn_train_anchors_per_image = x;
        }
        if let Some(x) = self.pre_nms_limit {
            base.pre_nms_limit = x;
        }
        if let Some(x) = self.post_nms_rois_training {
            base.post_nms_rois_training = x;
        }
        if let Some(x) = self.post_nms_rois_inference {
            base.post_nms_rois_inference = x;
        }
        if let Some(x) = self.use_mini_mask {
            base.use_mini_mask = x;
        }
        if let Some(x) = self.mini_mask_shape {
            base.mini_mask_shape = x;
        }
        if let Some(x) = self.image_resize_mode {
            base.image_resize_mode = x;
        }
        if let Some(x) = self.image_min_dim {
            base.image_min_dim = x;
        }
        if let Some(x) = self.image_max_dim {
            base.image_max_dim = x;
        }
        if let Some(x) = self.image_min_scale {
            base.image_min_scale = x;
        }
        if let Some(x) = self.image_channel_count {
            base.image_channel_count = x;
        }
        if let Some(x) = self.mean_pixel {
            base.mean_pixel = Array1::from(x);
        }
        if let Some(x) = self.train_rois_per_image {
            base.train_rois_per_image = x;
        }
        if let Some(x) = self.roi_positive_ratio {
            base.roi_positive_ratio = x;
        }
        if let Some(x) = self.pool_size {
            base.pool_size = x;
        }
        if let Some(x) = self.mask_pool_size {
            base.mask_pool_size = x;
        }
        if let Some(x) = self.mask_shape {
            base.mask_shape = x;
        }
        if let Some(x) = self.max_gt_instances {
            base.max_gt_instances = x;
        }
        if let Some(x) = self.rpn_bbox_std_dev {
            base.rpn_bbox_std_dev = Array1::from(x);
        }
        if let Some(x) = self.bbox_std_dev {
            base.bbox_std_dev = Array1::from(x);
        }
        if let Some(x) = self.detection_max_instances {
            base.detection_max_instances = x;
        }
        if let Some(x) = self.detection_min_confidence {
            base.detection_min_confidence = x;
        }
        if let Some(x) = self.detection_nms_threshold {
            base.detection_nms_threshold = x;
        }
        if let Some(x) = self.learning_rate {
            base.learning_rate = x;
        }
        if let Some(x) = self.learning_momentum {
            base.learning_momentum = x;
        }
        if let Some(x) = self.weight_decay {
            base.weight_decay = x;
        }
        if let Some(x) = self.loss_weights {
            base.loss_weights = x;
        }
        if let Some(x) = self.use_rpn_rois {
            base.use_rpn_rois = x;
        }
        if let Some(x) = self.train_bn {
            base.train_bn = x;
        }
        if let Some(x) = self.gradient_clip_norm {
            base.gradient_clip_norm = x;
        }
        base
    }
}
