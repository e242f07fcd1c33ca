//! Sample data and on-disk template sites

use lazy_static::lazy_static;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

lazy_static! {
    /// The backing object most tests render against
    pub static ref PERSON: Value = json!({
        "name": "Dhanji",
        "clazz": "content",
        "id": 12,
        "admin": false,
        "tags": ["rust", "web"],
        "owner": { "login": "dhanji" },
    });
}

/// A page touching every builtin directive, rendered against [`PERSON`]
pub const SHOWCASE_TEMPLATE: &str = r#"<html>
<head>
  @Require <link rel="stylesheet" href="site.css">
</head>
<body class="${clazz}">
  <h1>Hello ${name.toUpperCase()}</h1>
  @ShowIf(admin)<p>admin</p>
  <ul>@Repeat(items=tags, var=tag)<li>${index}:${tag}</li></ul>
</body>
</html>"#;

/// A directory of templates, data files and an optional trellis.toml
///
/// Files are written eagerly; the directory is removed on drop.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: crate::temp_dir_in_workspace(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file inside the site
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write any file, creating parent directories
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
        self
    }

    pub fn template(self, relative: &str, markup: &str) -> Self {
        self.file(relative, markup)
    }

    /// Write `value` as pretty JSON
    pub fn json(self, relative: &str, value: &Value) -> Self {
        let content = serde_json::to_string_pretty(value).expect("Value always serializes");
        self.file(relative, &content)
    }

    /// Write trellis.toml at the site root
    pub fn config(self, content: &str) -> Self {
        self.file("trellis.toml", content)
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
