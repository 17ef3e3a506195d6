use std::{fs, io};

use tracing::{debug, error};

/// Resolves a secret from `file_var` (a path to a file holding the secret, as
/// mounted by Docker or Kubernetes) or, failing that, from `var` directly.
///
/// `lookup` maps a variable name to its value; production code passes
/// `|name| std::env::var(name).ok()`.
///
/// The file variant wins when both are set. File contents are trimmed.
pub fn get_secret<F>(lookup: F, file_var: &str, var: &str) -> io::Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret_file_path) = lookup(file_var) {
        debug!(%secret_file_path, "Reading secret from file");
        return match fs::read_to_string(&secret_file_path) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) => {
                error!(%secret_file_path, ?e, "Error reading secret file");
                Err(e)
            }
        };
    }

    Ok(lookup(var))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn plain_variable_is_used_without_file() {
        let lookup = lookup_from(&[("JWT_SECRET", "hunter2")]);
        let secret = get_secret(lookup, "JWT_SECRET_FILE", "JWT_SECRET").unwrap();
        assert_eq!(secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn file_takes_precedence_and_is_trimmed() {
        let path = std::env::temp_dir().join(format!("secret-{}", uuid::Uuid::new_v4()));
        fs::write(&path, "from-file\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let lookup = lookup_from(&[
            ("JWT_SECRET_FILE", path_str.as_str()),
            ("JWT_SECRET", "from-env"),
        ]);
        let secret = get_secret(lookup, "JWT_SECRET_FILE", "JWT_SECRET").unwrap();

        fs::remove_file(&path).ok();
        assert_eq!(secret.as_deref(), Some("from-file"));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let lookup = lookup_from(&[("JWT_SECRET_FILE", "/definitely/not/here")]);
        assert!(get_secret(lookup, "JWT_SECRET_FILE", "JWT_SECRET").is_err());
    }

    #[test]
    fn absent_everywhere_is_none() {
        let lookup = lookup_from(&[]);
        assert!(
            get_secret(lookup, "JWT_SECRET_FILE", "JWT_SECRET")
                .unwrap()
                .is_none()
        );
    }
}
