extern crate bvr_mask_rcnn;

use ndarray::{array, Array1};
use bvr_mask_rcnn::common::{Backbone, BaseConfig, ConfigOverrides, ImageResizeMode, LossWeights,
                            MaskRcnnConfig, IMAGE_META_FIXED_SIZE, MRCNN_MASK_LOSS, LOSS_NAMES};

fn first_stage_only(shape: &Array1<u32>) -> Vec<[u32; 2]> {
    vec![[shape[0] / 2, shape[1] / 2]]
}

#[test]
fn defaults_resolve_derived_fields() {
    let config = MaskRcnnConfig::default();

    assert_eq!(config.settings().gpu_count, 1);
    assert_eq!(config.settings().images_per_gpu, 2);
    assert_eq!(config.batch_size(), 2);
    assert_eq!(config.settings().image_resize_mode, ImageResizeMode::Square);
    assert_eq!(config.image_shape(), &array![1024u32, 1024, 3]);
    assert_eq!(config.settings().num_classes, 1);
    assert_eq!(config.image_meta_size(), 13);
    assert_eq!(config.name(), None);
}

#[test]
fn crop_mode_uses_min_dim() {
    let config = MaskRcnnConfig::new(ConfigOverrides::new()
        .with_num_classes(81)
        .with_image_resize_mode(ImageResizeMode::Crop)
        .with_image_min_dim(512));

    assert_eq!(config.image_shape(), &array![512u32, 512, 3]);
    assert_eq!(config.image_meta_size(), 93);
}

#[test]
fn non_crop_modes_use_max_dim() {
    for mode in [ImageResizeMode::None, ImageResizeMode::Square, ImageResizeMode::Pad64] {
        let config = MaskRcnnConfig::new(ConfigOverrides::new()
            .with_image_resize_mode(mode)
            .with_image_min_dim(256)
            .with_image_max_dim(640)
            .with_image_channel_count(4));
        assert_eq!(config.image_shape(), &array![640u32, 640, 4], "mode {:?}", mode);
    }
}

#[test]
fn batch_size_is_images_per_gpu_times_gpu_count() {
    for gpu_count in 1..=4 {
        for images_per_gpu in 1..=8 {
            let config = MaskRcnnConfig::new(ConfigOverrides::new()
                .with_gpu_count(gpu_count)
                .with_images_per_gpu(images_per_gpu));
            assert_eq!(config.batch_size(), images_per_gpu * gpu_count);
        }
    }
}

#[test]
fn image_meta_size_tracks_num_classes() {
    for num_classes in [1, 2, 21, 81, 1000] {
        let config = MaskRcnnConfig::new(ConfigOverrides::new().with_num_classes(num_classes));
        assert_eq!(config.image_meta_size(), 12 + num_classes);
        assert_eq!(config.image_meta_size(), IMAGE_META_FIXED_SIZE + num_classes);
    }
}

#[test]
fn single_override_leaves_other_fields_alone() {
    let defaults = MaskRcnnConfig::default();
    let config = MaskRcnnConfig::new(ConfigOverrides::new().with_num_classes(80));

    assert_eq!(config.settings().num_classes, 80);
    assert_eq!(config.image_meta_size(), 92);
    assert_eq!(config.batch_size(), defaults.batch_size());
    assert_eq!(config.image_shape(), defaults.image_shape());

    // Every displayed value apart from the two that depend on NUM_CLASSES is unchanged
    let changed: Vec<&str> = defaults.entries().iter()
        .zip(config.entries().iter())
        .filter(|(a, b)| a.1 != b.1)
        .map(|(a, _)| a.0)
        .collect();
    assert_eq!(changed, vec!["IMAGE_META_SIZE", "NUM_CLASSES"]);
}

#[test]
fn out_of_range_values_pass_through() {
    let config = MaskRcnnConfig::new(ConfigOverrides::new()
        .with_num_classes(0)
        .with_gpu_count(0)
        .with_detection_min_confidence(7.5));

    assert_eq!(config.batch_size(), 0);
    assert_eq!(config.image_meta_size(), 12);
    assert_eq!(config.settings().detection_min_confidence, 7.5);
}

#[test]
fn overrides_apply_on_a_custom_base() {
    let base = BaseConfig {
        name: Some("shapes".to_string()),
        gpu_count: 2,
        ..BaseConfig::default()
    };
    let config = MaskRcnnConfig::from_parts(base, ConfigOverrides::new().with_images_per_gpu(4));

    assert_eq!(config.name(), Some("shapes"));
    assert_eq!(config.batch_size(), 8);
}

#[test]
fn rebuild_recomputes_derived_fields() {
    let original = MaskRcnnConfig::new(ConfigOverrides::new().with_name("coco").with_num_classes(81));
    let rebuilt = original.rebuild(ConfigOverrides::new()
        .with_image_resize_mode(ImageResizeMode::Crop)
        .with_gpu_count(2));

    assert_eq!(rebuilt.name(), Some("coco"));
    assert_eq!(rebuilt.image_meta_size(), 93);
    assert_eq!(rebuilt.image_shape(), &array![800u32, 800, 3]);
    assert_eq!(rebuilt.batch_size(), 4);

    // The original is untouched
    assert_eq!(original.image_shape(), &array![1024u32, 1024, 3]);
    assert_eq!(original.batch_size(), 2);
}

#[test]
fn array_and_enum_overrides() {
    let config = MaskRcnnConfig::new(ConfigOverrides::new()
        .with_backbone(Backbone::ResNet50)
        .with_mean_pixel(&[1.0, 2.0, 3.0])
        .with_bbox_std_dev(&[0.5, 0.5, 0.5, 0.5])
        .with_train_bn(None));

    assert_eq!(config.settings().backbone, Backbone::ResNet50);
    assert_eq!(config.settings().mean_pixel, array![1.0f32, 2.0, 3.0]);
    assert_eq!(config.settings().bbox_std_dev, array![0.5f32, 0.5, 0.5, 0.5]);
    assert_eq!(config.settings().rpn_bbox_std_dev, array![0.1f32, 0.1, 0.2, 0.2]);
    assert_eq!(config.settings().train_bn, None);
}

#[test]
fn backbone_shapes_round_up() {
    let config = MaskRcnnConfig::default();
    assert_eq!(config.backbone_shapes(), vec![[256, 256], [128, 128], [64, 64], [32, 32], [16, 16]]);

    let odd = MaskRcnnConfig::new(ConfigOverrides::new().with_image_max_dim(1000));
    assert_eq!(odd.backbone_shapes().last(), Some(&[16, 16]));
    assert_eq!(odd.backbone_shapes()[0], [250, 250]);
}

#[test]
fn custom_backbone_shape_function_is_used() {
    let config = MaskRcnnConfig::new(ConfigOverrides::new()
        .with_compute_backbone_shape(first_stage_only));
    assert_eq!(config.backbone_shapes(), vec![[512, 512]]);
}

#[test]
fn loss_weights_keep_the_fixed_keys() {
    let weights = LossWeights::new().with_weight(MRCNN_MASK_LOSS, 2.0).unwrap();
    assert_eq!(weights.get(MRCNN_MASK_LOSS), Some(2.0));
    assert_eq!(weights.get("unknown_loss"), None);
    assert!(LossWeights::new().with_weight("unknown_loss", 2.0).is_none());

    let names: Vec<&str> = weights.iter().map(|(name, _)| name).collect();
    assert_eq!(names, LOSS_NAMES.to_vec());
}

#[test]
fn enums_parse_case_insensitively() {
    assert_eq!(ImageResizeMode::from_str("CROP"), Some(ImageResizeMode::Crop));
    assert_eq!(ImageResizeMode::from_str("pad64"), Some(ImageResizeMode::Pad64));
    assert_eq!(ImageResizeMode::from_str("stretch"), None);
    assert!(ImageResizeMode::is_valid_resize_mode("None"));
    assert_eq!(ImageResizeMode::all_resize_modes(), vec!["none", "square", "pad64", "crop"]);

    assert_eq!(Backbone::from_str("ResNet50"), Some(Backbone::ResNet50));
    assert_eq!(Backbone::from_str("vgg16"), None);
    assert_eq!(Backbone::default().name(), "resnet101");
}
