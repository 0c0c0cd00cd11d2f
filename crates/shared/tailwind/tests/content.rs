use std::fs;
use std::path::{Path, PathBuf};
use tally_tailwind::{ContentSet, TailwindConfig};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

#[test]
fn resolves_matching_files_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for file in [
        "frontend/templates/home.html",
        "frontend/templates/js/app.js",
        "frontend/templates/style.css",
        "frontend/static/other.html",
        "node_modules/flowbite/dist/flowbite.js",
        "node_modules/other/index.js",
        "tailwind.config.js",
    ] {
        touch(root, file);
    }

    let config = TailwindConfig::new([
        "./frontend/templates/**/*.{html,js}",
        "./node_modules/flowbite/**/*.js",
    ])
    .with_base_dir(root);
    let set = ContentSet::compile(&config).unwrap();
    let files = set.resolve(set.base_dir()).unwrap();

    assert_eq!(
        files,
        [
            PathBuf::from("frontend/templates/home.html"),
            PathBuf::from("frontend/templates/js/app.js"),
            PathBuf::from("node_modules/flowbite/dist/flowbite.js"),
        ]
    );
}

#[test]
fn node_modules_is_skipped_unless_named() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "src/a.js");
    touch(dir.path(), "node_modules/pkg/b.js");

    let set = ContentSet::compile(&TailwindConfig::new(["**/*.js"])).unwrap();
    assert_eq!(set.resolve(dir.path()).unwrap(), [PathBuf::from("src/a.js")]);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let set = ContentSet::compile(&TailwindConfig::new(["**/*.html"])).unwrap();
    assert!(set.resolve(dir.path().join("absent")).is_err());
}
