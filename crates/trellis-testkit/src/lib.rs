//! Test utilities for trellis
//!
//! This crate provides shared testing utilities used across the trellis workspace.

mod fixtures;

pub use fixtures::{PERSON, SHOWCASE_TEMPLATE, SiteFixture};

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// This keeps test files in one gitignored location that is easy to clean up
/// by hand if a test aborts before its `TempDir` is dropped.
///
/// # Panics
///
/// Panics if the current directory is unknown or `.tmp/` cannot be created.
///
/// # Examples
///
/// ```rust
/// use trellis_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// std::fs::write(temp.path().join("page.html"), "<p>hi</p>").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");
    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let tmp_base = std::env::current_dir()?.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_creates_in_tmp() {
        let temp = temp_dir_in_workspace();
        let path = temp.path();
        assert!(
            path.to_string_lossy().contains(".tmp"),
            "Path should contain .tmp, got: {}",
            path.display()
        );
        assert!(path.is_dir());
    }

    #[test]
    fn test_temp_dir_auto_cleanup() {
        let path = {
            let temp = temp_dir_in_workspace();
            temp.path().to_path_buf()
        };
        assert!(!path.exists(), "Directory should not exist after drop: {}", path.display());
    }

    #[test]
    fn test_try_temp_dir_in_workspace_returns_ok() {
        let temp = try_temp_dir_in_workspace().unwrap();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_site_fixture_writes_files() {
        let site = SiteFixture::new()
            .template("page.html", "<p>${name}</p>")
            .json("data.json", &PERSON)
            .config("[render]\non_evaluation_error = \"marker\"\n");

        assert_eq!(
            std::fs::read_to_string(site.path("page.html")).unwrap(),
            "<p>${name}</p>"
        );
        let data: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(site.path("data.json")).unwrap())
                .unwrap();
        assert_eq!(data["name"], "Dhanji");
        assert!(site.path("trellis.toml").exists());
    }

    #[test]
    fn test_site_fixture_creates_nested_dirs() {
        let site = SiteFixture::new().template("embeds/fave.html", "<b>fave</b>");
        assert!(site.path("embeds/fave.html").is_file());
    }
}
