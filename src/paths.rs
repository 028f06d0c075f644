//! Per-user directories used by foldertools.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "foldertools";

/// Application directory inside a platform cache root.
pub fn cache_dir_in(cache_root: &Path) -> PathBuf {
    cache_root.join(APP_DIR_NAME)
}

/// OCR scratch directory, e.g. `~/.cache/foldertools` on Linux.
///
/// Grayscale images handed to the OCR engine are written here and removed
/// after recognition. `None` when the platform has no cache directory.
pub fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|root| cache_dir_in(&root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_in_appends_app_name() {
        let root = Path::new("/var/cache/someone");
        assert_eq!(cache_dir_in(root), Path::new("/var/cache/someone/foldertools"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_cache_dir_follows_xdg_cache_home() {
        // dirs reads XDG_CACHE_HOME when it is an absolute path.
        std::env::set_var("XDG_CACHE_HOME", "/tmp/foldertools-xdg-cache");
        assert_eq!(
            get_cache_dir(),
            Some(PathBuf::from("/tmp/foldertools-xdg-cache/foldertools"))
        );
    }
}
