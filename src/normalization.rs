use serde::{Deserialize, Deserializer};

/// Normalizes a form value by stripping surrounding whitespace and
/// composing it into Unicode Normalization Form C, so that accented
/// choices compare equal however the browser encoded them.
///
/// ```
/// use co2_survey::normalization::normalize_text;
/// assert_eq!(normalize_text(" Ama\u{301}pa "), "Amápa");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfc().to_string()
}

/// Deserializes an optional `String` after running it through
/// `normalize_text`, treating blank values as absent.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_text).filter(|s| !s.is_empty()))
}
