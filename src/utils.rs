// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions for the gesture library

/// Index and value of the largest element.
///
/// NaN entries never win; ties keep the first index.
///
/// # Returns
///
/// `None` for an empty slice.
#[must_use]
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Pluralize a gesture or word for summary output (e.g. "2 air taps").
#[must_use]
pub fn pluralize(word: &str) -> String {
    match word {
        "none" | "others" => word.to_string(),
        _ => {
            if word.ends_with('s') || word.ends_with("ch") || word.ends_with("sh") {
                format!("{word}es")
            } else if word.ends_with('y') && !word.ends_with("ey") && !word.ends_with("ay") {
                format!("{}ies", &word[..word.len() - 1])
            } else {
                format!("{word}s")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(argmax(&[0.5, 0.5]), Some((0, 0.5)));
        assert_eq!(argmax(&[f32::NAN, -1.0]), Some((1, -1.0)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("punch"), "punches");
        assert_eq!(pluralize("bloom"), "blooms");
        assert_eq!(pluralize("hobby"), "hobbies");
        assert_eq!(pluralize("none"), "none");
    }
}
