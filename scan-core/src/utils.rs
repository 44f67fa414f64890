use core::time::Duration;

/// Current time as a duration since the unix epoch.
///
/// A clock set before 1970 reads as the epoch itself.
pub fn now() -> Duration {
    #[cfg(target_arch = "wasm32")]
    return instant::SystemTime::now()
        .duration_since(instant::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();

    #[cfg(not(target_arch = "wasm32"))]
    return std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
}

/// Strips a case-insensitive `scheme:` prefix, e.g. `lightning:` or `LIGHTNING:`.
pub(crate) fn strip_scheme<'a>(input: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix = input.get(..scheme.len())?;
    if !prefix.eq_ignore_ascii_case(scheme) {
        return None;
    }
    input.get(scheme.len()..)?.strip_prefix(':')
}
