use std::env::var;

use uuid::Uuid;

/// Get the value of ENV var, when it is set and not empty
pub fn optional_env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    optional_env_var(var_name).unwrap_or_else(or_else)
}

/// Generate a random secret
pub fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
