//! Log-safe renderings of account identifiers.

/// Keeps the first character and stars out the rest.
pub fn mask_string(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.count();
            format!("{}{}", first, "*".repeat(rest))
        }
        None => "*".to_string(),
    }
}

/// Keeps the first two digits of a numeric id.
pub fn mask_uid(uid: &str) -> String {
    let chars: Vec<char> = uid.chars().collect();
    match chars.len() {
        0 => "*".to_string(),
        1 | 2 => format!("{}*", chars[0]),
        n => format!("{}{}", chars[..2].iter().collect::<String>(), "*".repeat(n - 2)),
    }
}

/// First character plus a fixed-width tail, so the length of a secret never shows.
pub fn mask_secret(s: &str) -> String {
    match s.chars().next() {
        Some(first) => format!("{}***", first),
        None => "*".to_string(),
    }
}

/// Names the first cookie pair and masks its value, e.g. `SESSDATA=a***`.
pub fn mask_cookie(cookie: &str) -> String {
    let first = cookie.split(';').next().unwrap_or_default().trim();
    match first.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            format!("{}={}", name.trim(), mask_secret(value.trim()))
        }
        _ => mask_secret(first),
    }
}
