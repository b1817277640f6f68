use ndarray::{array, Array1};
use crate::common::{Backbone, ConfigOverrides, ImageResizeMode, LossWeights};

/// Computes the `[height, width]` of each backbone stage from the image shape.
pub type BackboneShapeFn = fn(&Array1<u32>) -> Vec<[u32; 2]>;

/// Size of the image meta vector before the per-class entries.
pub const IMAGE_META_FIXED_SIZE: usize = 1 + 3 + 3 + 4 + 1;

/// Every settable Mask R-CNN setting, at its default value until overridden.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// Identifies the configuration variant.
    pub name: Option<String>,

    /// Number of GPUs to use. 1 means CPU or a single GPU.
    pub gpu_count: usize,
    /// A 12GB GPU can typically handle 2 images of 1024x1024px.
    pub images_per_gpu: usize,

    /// Training steps per epoch. Doesn't need to match the size of the training set.
    pub steps_per_epoch: usize,
    /// Validation steps run at the end of every training epoch.
    pub validation_steps: usize,

    pub backbone: Backbone,
    /// Replaces the default backbone shape computation when set.
    pub compute_backbone_shape: Option<BackboneShapeFn>,
    /// Strides of each layer of the FPN pyramid, based on a ResNet101 backbone.
    pub backbone_strides: Vec<u32>,

    pub fpn_classif_fc_layers_size: usize,
    pub top_down_pyramid_size: usize,

    /// Number of classification classes, including background.
    pub num_classes: usize,

    /// Length of the square anchor side in pixels, one per pyramid level.
    pub rpn_anchor_scales: [u32; 5],
    /// Width/height ratios of anchors at each cell.
    pub rpn_anchor_ratios: Vec<f32>,
    /// 1 creates anchors for every backbone feature map cell, 2 for every other cell.
    pub rpn_anchor_stride: usize,
    pub rpn_nms_threshold: f32,
    pub rpn_train_anchors_per_image: usize,

    /// ROIs kept after top-k selection and before non-maximum suppression.
    pub pre_nms_limit: usize,
    pub post_nms_rois_training: usize,
    pub post_nms_rois_inference: usize,

    pub use_mini_mask: bool,
    /// (height, width) of the mini-mask.
    pub mini_mask_shape: (u32, u32),

    pub image_resize_mode: ImageResizeMode,
    pub image_min_dim: u32,
    pub image_max_dim: u32,
    /// Minimum scaling ratio, checked after `image_min_dim`. 0 disables it.
    pub image_min_scale: f32,
    pub image_channel_count: u32,

    /// Image mean (RGB).
    pub mean_pixel: Array1<f32>,

    pub train_rois_per_image: usize,
    pub roi_positive_ratio: f32,

    pub pool_size: usize,
    pub mask_pool_size: usize,
    pub mask_shape: [u32; 2],

    pub max_gt_instances: usize,

    pub rpn_bbox_std_dev: Array1<f32>,
    pub bbox_std_dev: Array1<f32>,

    pub detection_max_instances: usize,
    /// Detections below this confidence are skipped.
    pub detection_min_confidence: f32,
    pub detection_nms_threshold: f32,

    pub learning_rate: f32,
    pub learning_momentum: f32,
    pub weight_decay: f32,

    pub loss_weights: LossWeights,

    /// Use RPN ROIs or externally generated ROIs for training.
    pub use_rpn_rois: bool,

    /// `Some(false)` freezes batch-norm layers, `None` leaves them in inference mode.
    pub train_bn: Option<bool>,

    pub gradient_clip_norm: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            name: None,
            gpu_count: 1,
            images_per_gpu: 2,
            steps_per_epoch: 1000,
            validation_steps: 50,
            backbone: Backbone::ResNet101,
            compute_backbone_shape: None,
            backbone_strides: vec![4, 8, 16, 32, 64],
            fpn_classif_fc_layers_size: 1024,
            top_down_pyramid_size: 256,
            num_classes: 1,
            rpn_anchor_scales: [32, 64, 128, 256, 512],
            rpn_anchor_ratios: vec![0.5, 1.0, 2.0],
            rpn_anchor_stride: 1,
            rpn_nms_threshold: 0.7,
            rpn_train_anchors_per_image: 256,
            pre_nms_limit: 6000,
            post_nms_rois_training: 2000,
            post_nms_rois_inference: 1000,
            use_mini_mask: true,
            mini_mask_shape: (56, 56),
            image_resize_mode: ImageResizeMode::Square,
            image_min_dim: 800,
            image_max_dim: 1024,
            image_min_scale: 0.0,
            image_channel_count: 3,
            mean_pixel: array![123.7, 116.8, 103.9],
            train_rois_per_image: 200,
            roi_positive_ratio: 0.33,
            pool_size: 7,
            mask_pool_size: 14,
            mask_shape: [28, 28],
            max_gt_instances: 100,
            rpn_bbox_std_dev: array![0.1, 0.1, 0.2, 0.2],
            bbox_std_dev: array![0.1, 0.1, 0.2, 0.2],
            detection_max_instances: 100,
            detection_min_confidence: 0.7,
            detection_nms_threshold: 0.3,
            learning_rate: 0.001,
            learning_momentum: 0.9,
            weight_decay: 0.0001,
            loss_weights: LossWeights::default(),
            use_rpn_rois: true,
            train_bn: Some(false),
            gradient_clip_norm: 5.0,
        }
    }
}

/// A resolved configuration. Derived fields are computed once, when the
/// value is built, and there is no way to change a setting afterwards
/// other than building a new one with [`MaskRcnnConfig::rebuild`].
#[derive(Debug, Clone)]
pub struct MaskRcnnConfig {
    settings: BaseConfig,
    batch_size: usize,
    image_shape: Array1<u32>,
    image_meta_size: usize,
}

impl Default for MaskRcnnConfig {
    fn default() -> Self {
        Self::new(ConfigOverrides::default())
    }
}

impl MaskRcnnConfig {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self::from_parts(BaseConfig::default(), overrides)
    }

    pub fn from_parts(base: BaseConfig, overrides: ConfigOverrides) -> Self {
        Self::resolve(overrides.apply(base))
    }

    pub fn from_base(settings: BaseConfig) -> Self {
        Self::resolve(settings)
    }

    /// Builds a new configuration using this one's settings as the base.
    pub fn rebuild(&self, overrides: ConfigOverrides) -> Self {
        Self::from_parts(self.settings.clone(), overrides)
    }

    // Nothing is validated here, out of range values go through as given.
    fn resolve(settings: BaseConfig) -> Self {
        if settings.num_classes == 0 {
            log::warn!("NUM_CLASSES is 0, it should at least count the background class");
        }
        if settings.gpu_count == 0 || settings.images_per_gpu == 0 {
            log::warn!("BATCH_SIZE resolves to 0 (GPU_COUNT={}, IMAGES_PER_GPU={})",
                       settings.gpu_count, settings.images_per_gpu);
        }

        let batch_size = settings.images_per_gpu.saturating_mul(settings.gpu_count);

        let image_shape = match settings.image_resize_mode {
            ImageResizeMode::Crop => array![settings.image_min_dim, settings.image_min_dim,
                                            settings.image_channel_count],
            _ => array![settings.image_max_dim, settings.image_max_dim,
                        settings.image_channel_count],
        };

        let image_meta_size = IMAGE_META_FIXED_SIZE.saturating_add(settings.num_classes);

        Self {
            settings,
            batch_size,
            image_shape,
            image_meta_size,
        }
    }

    pub fn settings(&self) -> &BaseConfig {
        &self.settings
    }

    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `[height, width, channels]` of the network input.
    pub fn image_shape(&self) -> &Array1<u32> {
        &self.image_shape
    }

    pub fn image_meta_size(&self) -> usize {
        self.image_meta_size
    }

    /// `[height, width]` of each backbone stage's output. Uses
    /// `compute_backbone_shape` when set, otherwise divides the image shape
    /// by each stride and rounds up.
    pub fn backbone_shapes(&self) -> Vec<[u32; 2]> {
        if let Some(compute) = self.settings.compute_backbone_shape {
            return compute(&self.image_shape);
        }

        let (height, width) = (self.image_shape[0], self.image_shape[1]);
        self.settings.backbone_strides.iter()
            .filter(|stride| **stride > 0)
            .map(|stride| [height.div_ceil(*stride), width.div_ceil(*stride)])
            .collect()
    }
}
