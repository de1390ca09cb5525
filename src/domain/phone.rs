/// Rewrites a local-format number (`07...`) to the `254` country prefix.
/// Anything else is forwarded unchanged; length and digits are not checked.
pub fn normalize_phone(phone: &str) -> String {
    match phone.strip_prefix('0') {
        Some(rest) => format!("254{}", rest),
        None => phone.to_string(),
    }
}
