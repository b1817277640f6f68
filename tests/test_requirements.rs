use std::fs;
use std::path::Path;
use bvr_mask_rcnn::data::{build_package_metadata, load_install_requires, parse_requirements,
                          PackageMetadata, Requirement};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reads_specifiers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "requirements.txt", "\
# core
numpy
scipy >= 1.2, <2   # inline comment
Pillow
tensorflow>=2.0.0; python_version >= \"3.6\"
scikit-image[data]>=0.16
ipython[all]
keras @ https://example.com/keras.tar.gz
");

    let requires = load_install_requires(&path);
    assert_eq!(requires, vec![
        "numpy",
        "scipy>=1.2,<2",
        "Pillow",
        "tensorflow>=2.0.0; python_version >= \"3.6\"",
        "scikit-image[data]>=0.16",
        "ipython[all]",
        "keras @ https://example.com/keras.tar.gz",
    ]);
}

#[test]
fn joins_continuations_and_follows_includes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "base.txt", "h5py\n");
    let path = write(dir.path(), "requirements.txt", "\
-r base.txt
--index-url https://pypi.org/simple
opencv-python\\
>=4.0
");

    let requirements = parse_requirements(&path).unwrap();
    let names: Vec<&str> = requirements.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["h5py", "opencv-python"]);
    assert_eq!(requirements[1].specifiers, vec![">=4.0"]);
}

#[test]
fn self_include_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "requirements.txt", "numpy\n-r requirements.txt\n");

    assert!(parse_requirements(&path).is_err());
    assert!(load_install_requires(&path).is_empty());
}

#[test]
fn missing_file_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");

    assert!(parse_requirements(&missing).is_err());
    assert!(load_install_requires(&missing).is_empty());
}

#[test]
fn malformed_file_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "requirements.txt", "numpy\n==1.0\n");

    let err = parse_requirements(&path).unwrap_err();
    assert!(format!("{:#}", err).contains(":2"));
    assert!(load_install_requires(&path).is_empty());
}

#[test]
fn requirement_parsing() {
    let req = Requirement::parse("Keras[tests,docs] (>=2.0.8, !=2.1.0)").unwrap();
    assert_eq!(req.name, "Keras");
    assert_eq!(req.extras, vec!["docs", "tests"]);
    assert_eq!(req.specifiers, vec![">=2.0.8", "!=2.1.0"]);
    assert_eq!(req.to_string(), "Keras[docs,tests]>=2.0.8,!=2.1.0");

    assert!(Requirement::parse("numpy >= ").is_err());
    assert!(Requirement::parse("not a requirement").is_err());
    assert!(Requirement::parse("pkg[bad extra]").is_err());
}

#[test]
fn metadata_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "requirements.txt", "numpy\nimgaug\n");

    let metadata = build_package_metadata(Some(path.as_path()));
    assert_eq!(metadata.name, "mask-rcnn");
    assert_eq!(metadata.version, "2.1");
    assert_eq!(metadata.license, "MIT");
    assert_eq!(metadata.classifiers.len(), 17);
    assert!(metadata.classifiers.contains(&"Topic :: Scientific/Engineering :: Image Segmentation".to_string()));
    assert_eq!(metadata.install_requires, vec!["numpy", "imgaug"]);

    let json = metadata.to_json().unwrap();
    let back: PackageMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(back, metadata);
}

#[test]
fn metadata_without_requirements() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = build_package_metadata(Some(dir.path().join("requirements.txt").as_path()));

    assert!(metadata.install_requires.is_empty());
    assert_eq!(metadata, PackageMetadata::mask_rcnn(Vec::new()));
}

#[test]
fn shared_include_is_read_from_each_parent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "common.txt", "numpy\n");
    write(dir.path(), "train.txt", "-r common.txt\nimgaug\n");
    write(dir.path(), "viz.txt", "-r common.txt\nmatplotlib\n");
    let path = write(dir.path(), "requirements.txt", "-r train.txt\n-r viz.txt\n");

    let requires = load_install_requires(&path);
    assert_eq!(requires, vec!["numpy", "imgaug", "numpy", "matplotlib"]);
}

#[test]
fn include_cycle_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "numpy\n-r b.txt\n");
    write(dir.path(), "b.txt", "scipy\n-r a.txt\n");
    let path = write(dir.path(), "requirements.txt", "-r a.txt\n");

    let err = parse_requirements(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("a.txt includes itself"));
    assert!(load_install_requires(&path).is_empty());
}

#[test]
fn reads_bare_links() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "requirements.txt", "\
numpy
git+https://github.com/aleju/imgaug.git
git+https://github.com/cocodataset/cocoapi.git@master#egg=pycocotools&subdirectory=PythonAPI
https://example.com/pkgs/shapely-1.7.1.tar.gz
-e git+https://github.com/matterport/Mask_RCNN.git#egg=mask-rcnn
-e .
");

    let requirements = parse_requirements(&path).unwrap();
    let names: Vec<&str> = requirements.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["numpy", "imgaug", "pycocotools", "shapely", "mask-rcnn"]);
    assert_eq!(requirements[1].url.as_deref(), Some("git+https://github.com/aleju/imgaug.git"));
    assert_eq!(requirements[1].to_string(), "imgaug @ git+https://github.com/aleju/imgaug.git");
}

#[test]
fn link_without_project_name_is_an_error() {
    assert!(Requirement::parse("https://example.com/").is_err());

    let req = Requirement::parse("https://example.com/dist/torch-2.1.0-cp39-none-linux_x86_64.whl").unwrap();
    assert_eq!(req.name, "torch");
    assert!(req.specifiers.is_empty());
}
