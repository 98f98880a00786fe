//! Secret detection for telemetry tags and error metadata.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Words that mark a key as secret on their own.
const SECRET_WORDS: &[&str] = &[
    "token",
    "secret",
    "password",
    "passwd",
    "credential",
    "credentials",
    "auth",
    "authorization",
    "apikey",
];

/// Qualifiers that turn a trailing `key` into a secret (`api_key`, `privateKey`).
const SECRET_KEY_QUALIFIERS: &[&str] = &["api", "access", "private", "secret", "signing"];

/// Checks if a key likely refers to a secret.
///
/// Keys are split into words on `_`, `-`, `.` and camel-case boundaries and
/// matched word by word, so `partition_key` stays visible while `api_key`
/// does not.
///
/// # Examples
///
/// ```
/// use recstat_shared::is_secret_key;
///
/// assert!(is_secret_key("api_key"));
/// assert!(is_secret_key("AUTH_HEADER"));
/// assert!(!is_secret_key("partition_key"));
/// assert!(!is_secret_key("stream"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let words = split_words(key);
    words.iter().any(|word| SECRET_WORDS.contains(&word.as_str()))
        || words.windows(2).any(|pair| {
            pair[1] == "key" && SECRET_KEY_QUALIFIERS.contains(&pair[0].as_str())
        })
}

fn split_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for character in key.chars() {
        if matches!(character, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if character.is_ascii_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = character.is_ascii_lowercase() || character.is_ascii_digit();
        current.push(character.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
