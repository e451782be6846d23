//! XDG Base Directory paths for cartweek.
//!
//! XDG paths are used on every platform, so the data directory is easy to
//! find and to share between the `prepare` and `serve` commands.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "cartweek";

/// Environment variable that points straight at the data directory
pub const DATA_DIR_ENV: &str = "CARTWEEK_DATA_DIR";

fn resolve(xdg: Option<String>, home: Option<PathBuf>, home_relative: &str) -> PathBuf {
    match (xdg.filter(|v| !v.is_empty()), home) {
        (Some(base), _) => PathBuf::from(base).join(APP_DIR),
        (None, Some(home)) => home.join(home_relative).join(APP_DIR),
        (None, None) => Path::new(home_relative).join(APP_DIR),
    }
}

/// Get the cartweek config directory.
///
/// Returns `$XDG_CONFIG_HOME/cartweek` if set, otherwise `~/.config/cartweek`.
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
}

/// Get the cartweek data directory holding `raw/` and `processed/`.
///
/// Returns `$CARTWEEK_DATA_DIR` if set, then `$XDG_DATA_HOME/cartweek`,
/// otherwise `~/.local/share/cartweek`.
///
/// # Examples
///
/// ```
/// use cartweek_paths::data_dir;
///
/// let processed = data_dir().join("processed");
/// ```
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    resolve(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_value_wins() {
        let path = resolve(
            Some("/tmp/xdg".into()),
            Some(PathBuf::from("/home/ana")),
            ".local/share",
        );
        assert_eq!(path, PathBuf::from("/tmp/xdg/cartweek"));
    }

    #[test]
    fn falls_back_to_home() {
        let path = resolve(None, Some(PathBuf::from("/home/ana")), ".local/share");
        assert_eq!(path, PathBuf::from("/home/ana/.local/share/cartweek"));
    }

    #[test]
    fn empty_xdg_value_is_ignored() {
        let path = resolve(Some(String::new()), Some(PathBuf::from("/home/ana")), ".local/share");
        assert_eq!(path, PathBuf::from("/home/ana/.local/share/cartweek"));
    }

    #[test]
    fn without_home_paths_are_relative() {
        assert_eq!(
            resolve(None, None, ".local/share"),
            PathBuf::from(".local/share/cartweek")
        );
    }

    #[test]
    fn config_dir_ends_with_cartweek() {
        assert!(config_dir().ends_with("cartweek"));
    }

    #[test]
    fn config_falls_back_to_dot_config() {
        let path = resolve(None, Some(PathBuf::from("/home/ana")), ".config");
        assert_eq!(path, PathBuf::from("/home/ana/.config/cartweek"));
    }

    #[test]
    fn data_dir_respects_override() {
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/srv/cartweek-data");
        }
        let path = data_dir();
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
        assert_eq!(path, PathBuf::from("/srv/cartweek-data"));
    }
}
