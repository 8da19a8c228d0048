use phonenumber::country::Id;
use phonenumber::Mode;

/// Normalizes a phone number to E.164 (`+12015550123`).
///
/// Numbers without a country code are read as US numbers. Returns an empty
/// string when the input is not a valid number.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match phonenumber::parse(Some(Id::US), trimmed) {
        Ok(number) if phonenumber::is_valid(&number) => number.format().mode(Mode::E164).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_common_formats() {
        assert_eq!(normalize_phone("(201) 555-0123"), "+12015550123");
        assert_eq!(normalize_phone("201.555.0123"), "+12015550123");
        assert_eq!(normalize_phone("1-201-555-0123"), "+12015550123");
        assert_eq!(normalize_phone("+44 20 7946 0958"), "+442079460958");
    }

    #[test]
    fn test_invalid_numbers_become_empty() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("1111"), "");
        assert_eq!(normalize_phone("123-456-7890"), "");
        assert_eq!(normalize_phone("not a number"), "");
    }

    #[test]
    fn test_invalid_international_number_rejected() {
        assert_eq!(normalize_phone("+12345678"), "");
        assert_eq!(normalize_phone("+999 1234 5678"), "");
    }
}
