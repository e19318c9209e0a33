use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the database location
pub const DATABASE_PATH_ENV: &str = "SPRINTLENS_DATABASE_PATH";

const DATABASE_FILE: &str = "sprintlens.db";

/// Resolve where the board database lives.
///
/// An explicit path (the CLI's `--database`) wins, then `SPRINTLENS_DATABASE_PATH`,
/// then `~/.sprintlens/data/sprintlens.db`.
pub fn resolve_database_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var(DATABASE_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sprintlens")
            .join("data")
            .join(DATABASE_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env mutation cannot race another test.
    #[test]
    fn test_database_path_precedence() {
        let explicit = Path::new("/tmp/flag/board.db");

        env::set_var(DATABASE_PATH_ENV, "/custom/path/board.db");
        assert_eq!(resolve_database_path(Some(explicit)), explicit);
        assert_eq!(
            resolve_database_path(None),
            PathBuf::from("/custom/path/board.db")
        );

        env::set_var(DATABASE_PATH_ENV, "  ");
        assert!(resolve_database_path(None).ends_with(".sprintlens/data/sprintlens.db"));

        env::remove_var(DATABASE_PATH_ENV);
        assert!(resolve_database_path(None).ends_with(".sprintlens/data/sprintlens.db"));
    }
}
