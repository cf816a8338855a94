use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

/// Expand environment variables in a string using ${VAR_NAME} syntax.
/// Unknown variables are left as written.
pub fn expand_env_var_in_string(value: &str) -> String {
    let mut result = value.to_string();

    for cap in env_var_pattern().captures_iter(value) {
        let var_name = &cap[1];
        if let Ok(replacement) = env::var(var_name) {
            result = result.replace(&cap[0], &replacement);
        }
    }

    result
}

/// Accept only http(s) URLs and strip trailing slashes.
pub fn normalize_base_url(url: &str) -> Result<String, String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!("API URL must start with http:// or https://: {}", url));
    }
    if trimmed.contains("${") {
        return Err(format!("API URL references an unset variable: {}", url));
    }
    Ok(trimmed.to_string())
}
