//! Helpers for the code that collects documents before calling [`crate::classify`].

/// Decodes uploaded bytes as UTF-8, dropping invalid byte sequences instead of failing.
pub fn decode_document(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Trims surrounding whitespace, returning `None` when nothing is left to classify.
pub fn prepare_document(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"Consentimiento \xff\xfeinformado \xc3\xa1rea";
        assert_eq!(decode_document(bytes), "Consentimiento informado área");
    }

    #[test]
    fn test_decode_valid_utf8_unchanged() {
        let text = "Población vulnerable: menores de edad";
        assert_eq!(decode_document(text.as_bytes()), text);
    }

    #[test]
    fn test_prepare_document() {
        assert_eq!(prepare_document("  protocol text \n"), Some("protocol text"));
        assert_eq!(prepare_document(" \t\n "), None);
        assert_eq!(prepare_document(""), None);
    }
}
