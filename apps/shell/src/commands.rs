//! `tally tailwind ...`: every command writes its report to `out` and returns whether it
//! succeeded.

use crate::cli::TailwindCommand;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tally_tailwind::{ContentSet, TailwindConfig, load_all};

pub(crate) fn run(command: TailwindCommand, out: &mut impl Write) -> Result<bool> {
    match command {
        TailwindCommand::Check { paths } => check(&paths, out),
        TailwindCommand::Show { path, json } => show(&path, json, out),
        TailwindCommand::Files { path } => files(&path, out),
        TailwindCommand::Diff { left, right } => diff(&left, &right, out),
    }
}

fn check(paths: &[impl AsRef<Path>], out: &mut impl Write) -> Result<bool> {
    let mut healthy = true;
    for document in load_all(paths) {
        let path = document.path.display();
        match document.result.map(|config| config.validate()) {
            Ok(Ok(())) => writeln!(out, "ok      {path}")?,
            Ok(Err(report)) => {
                healthy = false;
                writeln!(out, "invalid {path}")?;
                for problem in report.problems() {
                    writeln!(out, "  {}: {}", problem.field, problem.message)?;
                }
            },
            Err(err) => {
                healthy = false;
                writeln!(out, "error   {path}\n  {err}")?;
            },
        }
    }
    Ok(healthy)
}

fn show(path: &Path, json: bool, out: &mut impl Write) -> Result<bool> {
    let config = TailwindConfig::load(path)?;
    if json {
        let rendered = serde_json::to_string_pretty(&config).context("Rendering JSON")?;
        writeln!(out, "{rendered}")?;
    } else {
        write!(out, "{}", config.to_js())?;
    }
    Ok(true)
}

fn files(path: &Path, out: &mut impl Write) -> Result<bool> {
    let config = TailwindConfig::load(path)?;
    let content = ContentSet::compile(&config)?;
    for file in content.resolve(content.base_dir())? {
        writeln!(out, "{}", file.display())?;
    }
    Ok(true)
}

fn diff(left: &Path, right: &Path, out: &mut impl Write) -> Result<bool> {
    let left = TailwindConfig::load(left)?;
    let right = TailwindConfig::load(right)?;
    for change in left.diff(&right) {
        writeln!(out, "{change}")?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SITE: &str = r#"module.exports = {
        content: ["./templates/**/*.html"],
        theme: { extend: {} },
        darkMode: "class",
        plugins: [require("flowbite/plugin")],
    };"#;

    fn fixture(name: &str, source: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        (dir, path)
    }

    fn output(command: TailwindCommand) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run(command, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn check_reports_each_document() {
        let (dir, good) = fixture("tailwind.config.js", SITE);
        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "content": [] }"#).unwrap();
        let missing = dir.path().join("missing.js");

        let (ok, text) = output(TailwindCommand::Check { paths: vec![good, invalid, missing] });
        assert!(!ok);
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("ok      "));
        assert!(lines[1].starts_with("invalid "));
        assert_eq!(lines[2], "  content: must list at least one glob");
        assert_eq!(lines[3], "  plugins: must register at least one plugin");
        assert!(lines[4].starts_with("error   "));
        assert!(lines[5].trim_start().starts_with("I/O error"));
    }

    #[test]
    fn check_passes_healthy_documents() {
        let (_dir, good) = fixture("tailwind.config.js", SITE);
        let (ok, _) = output(TailwindCommand::Check { paths: vec![good] });
        assert!(ok);
    }

    #[test]
    fn show_renders_both_forms() {
        let (_dir, path) = fixture("tailwind.config.js", SITE);

        let (_, js) = output(TailwindCommand::Show { path: path.clone(), json: false });
        assert!(js.contains("\tdarkMode: \"class\",\n"));
        assert!(js.contains("plugins: [require(\"flowbite/plugin\")]"));

        let (_, json) = output(TailwindCommand::Show { path, json: true });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["darkMode"], "class");
        assert_eq!(value["plugins"][0], "flowbite/plugin");
    }

    #[test]
    fn files_lists_matches_relative_to_the_document() {
        let (dir, path) = fixture("tailwind.config.js", SITE);
        fs::create_dir_all(dir.path().join("templates/partials")).unwrap();
        fs::write(dir.path().join("templates/home.html"), "").unwrap();
        fs::write(dir.path().join("templates/partials/nav.html"), "").unwrap();
        fs::write(dir.path().join("templates/app.css"), "").unwrap();

        let (_, text) = output(TailwindCommand::Files { path });
        let expected = [Path::new("templates/home.html"), Path::new("templates/partials/nav.html")]
            .map(|p| p.display().to_string());
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn diff_lists_changed_fields() {
        let (dir, left) = fixture("a.config.js", SITE);
        let right = dir.path().join("b.config.js");
        fs::write(&right, SITE.replace("\"class\"", "\"media\"")).unwrap();

        let (ok, text) = output(TailwindCommand::Diff { left, right });
        assert!(ok);
        assert_eq!(text.trim_end(), r#"darkMode: "class" -> "media""#);
    }

    #[test]
    fn unreadable_documents_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let command = TailwindCommand::Show { path: dir.path().join("nope.js"), json: false };
        assert!(run(command, &mut Vec::new()).is_err());
    }
}
