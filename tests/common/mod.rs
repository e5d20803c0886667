//! Shared fixtures: recipe repositories on disk, artifacts and a script
//! runner that records instead of executing.

#![allow(dead_code)]

use rootbeer::helpers::template::Variables;
use rootbeer::{FormatContext, InstallError, Phase, ScriptRunner};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding `recipes/` and `artifacts/`.
pub struct Repo {
    dir: TempDir,
}

impl Repo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("recipes")).unwrap();
        std::fs::create_dir_all(dir.path().join("artifacts")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn recipes(&self) -> PathBuf {
        self.dir.path().join("recipes")
    }

    /// Write `<name>.json` into the recipe directory.
    pub fn recipe(&self, name: &str, recipe: Value) -> PathBuf {
        let path = self.recipes().join(format!("{}.json", name));
        std::fs::write(&path, serde_json::to_string_pretty(&recipe).unwrap()).unwrap();
        path
    }

    /// Write a raw recipe body.
    pub fn raw_recipe(&self, name: &str, body: &str) -> PathBuf {
        let path = self.recipes().join(format!("{}.json", name));
        std::fs::write(&path, body).unwrap();
        path
    }

    pub fn artifact(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join("artifacts").join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn zip(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.dir.path().join("artifacts").join(name);
        write_zip(&path, entries);
        path
    }
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.zip");
    write_zip(&path, entries);
    std::fs::read(path).unwrap()
}

pub fn sha256(path: &Path) -> String {
    rootbeer::helpers::acquire::verify::sha256_file(path).unwrap()
}

/// A vendor_install recipe with all three phases set.
pub fn vendor(name: &str, location: &str, deps: &[&str]) -> Value {
    json!({
        "name": name,
        "version": "1.0",
        "strategy": "vendor_install",
        "location": location,
        "installDependencies": deps,
        "preInstall": "echo pre {package_name}",
        "install": "run {package_file}",
        "postInstall": "echo post {package_name}"
    })
}

pub fn context() -> FormatContext {
    FormatContext {
        user_path: PathBuf::from("/home/tester"),
        system_path: PathBuf::from("/Applications"),
        system_path_x86: None,
    }
}

#[derive(Debug, Clone)]
pub struct Ran {
    pub package: String,
    pub phase: Phase,
    pub vars: Variables,
    /// `package_file` existed while the phase ran.
    pub file_present: bool,
}

/// Records every phase it is asked to run.
#[derive(Default)]
pub struct Recorder {
    pub ran: RefCell<Vec<Ran>>,
}

impl Recorder {
    /// Packages in the order their first phase ran.
    pub fn packages(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for r in self.ran.borrow().iter() {
            if !seen.contains(&r.package) {
                seen.push(r.package.clone());
            }
        }
        seen
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.ran.borrow().iter().map(|r| r.phase).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ran.borrow().is_empty()
    }
}

impl ScriptRunner for Recorder {
    fn run(&self, phase: Phase, _body: &str, vars: &Variables) -> Result<(), InstallError> {
        self.ran.borrow_mut().push(Ran {
            package: vars["package_name"].clone(),
            phase,
            vars: vars.clone(),
            file_present: Path::new(&vars["package_file"]).exists(),
        });
        Ok(())
    }
}
