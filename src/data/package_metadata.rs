use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::data::{default_requirements_path, load_install_requires};

const LONG_DESCRIPTION: &str = "This is an implementation of Mask R-CNN on Python 3, Keras, and TensorFlow. \n\
The model generates bounding boxes and segmentation masks for each instance of an object in the image. \n\
It's based on Feature Pyramid Network (FPN) and a ResNet101 backbone.";

const CLASSIFIERS: [&str; 17] = [
    "Development Status :: 5 - Production/Stable",
    "Environment :: Console",
    "Intended Audience :: Developers",
    "Intended Audience :: Information Technology",
    "Intended Audience :: Education",
    "Intended Audience :: Science/Research",
    "License :: OSI Approved :: MIT License",
    "Natural Language :: English",
    "Operating System :: OS Independent",
    "Topic :: Scientific/Engineering :: Artificial Intelligence",
    "Topic :: Scientific/Engineering :: Image Recognition",
    "Topic :: Scientific/Engineering :: Visualization",
    "Topic :: Scientific/Engineering :: Image Segmentation",
    "Programming Language :: Python :: 3.6",
    "Programming Language :: Python :: 3.7",
    "Programming Language :: Python :: 3.8",
    "Programming Language :: Python :: 3.9",
];

/// Distribution metadata handed to the packaging tool. Nothing in here is
/// interpreted, the values go out exactly as they were set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub url: String,
    pub author: String,
    pub author_email: String,
    pub license: String,
    pub description: String,
    pub long_description: String,
    pub python_requires: String,
    pub classifiers: Vec<String>,
    pub keywords: String,
    pub install_requires: Vec<String>,
}

impl PackageMetadata {
    /// The mask-rcnn package as published by its authors.
    pub fn mask_rcnn(install_requires: Vec<String>) -> Self {
        Self {
            name: "mask-rcnn".to_string(),
            version: "2.1".to_string(),
            url: "https://github.com/matterport/Mask_RCNN".to_string(),
            author: "Matterport".to_string(),
            author_email: "waleed.abdulla@gmail.com".to_string(),
            license: "MIT".to_string(),
            description: "Mask R-CNN for object detection and instance segmentation".to_string(),
            long_description: LONG_DESCRIPTION.to_string(),
            python_requires: ">=3.6".to_string(),
            classifiers: CLASSIFIERS.iter().map(|x| x.to_string()).collect(),
            keywords: "image instance segmentation object detection mask rcnn r-cnn tensorflow keras".to_string(),
            install_requires,
        }
    }

    pub fn with_install_requires(mut self, install_requires: Vec<String>) -> Self {
        self.install_requires = install_requires;
        self
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reads the install requirements (falling back to none) and fills in the
/// package metadata. `None` reads `requirements.txt` from the working directory.
pub fn build_package_metadata(requirements_path: Option<&Path>) -> PackageMetadata {
    let path = requirements_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_requirements_path);
    let install_requires = load_install_requires(&path);
    log::info!("Loaded {} install requirements from {}", install_requires.len(), path.display());
    PackageMetadata::mask_rcnn(install_requires)
}
