//! Shared field validators for church and profile data.
//! Validation is plain character scanning; messages match what the frontend
//! already displays.

/// The 50 US state postal abbreviations.
pub const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

pub fn is_valid_state(value: &str) -> bool {
    let upper = value.to_uppercase();
    US_STATES.contains(&upper.as_str())
}

/// Accepts an optional leading `+`, an optional country `1`, then 10-13 digits.
pub fn is_valid_phone(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let len = rest.chars().count();
    // 10-13 digits outright, or 11-14 when the first is the country "1"
    (10..=13).contains(&len) || (rest.starts_with('1') && (11..=14).contains(&len))
}

/// US ZIP: five digits, optionally `-` plus four more.
pub fn is_valid_zipcode(value: &str) -> bool {
    let (head, tail) = match value.split_once('-') {
        Some((head, tail)) => (head, Some(tail)),
        None => (value, None),
    };
    if head.len() != 5 || !head.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match tail {
        None => true,
        Some(t) => t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()),
    }
}

/// Minimal structural check; real verification happens when mail is sent.
pub fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Trims and Title-Cases each whitespace-separated word. Church names and
/// cities are stored in this canonical form.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_valid_codes() {
        assert!(is_valid_state("KY"));
        assert!(is_valid_state("ca"));
    }

    #[test]
    fn test_state_rejects_full_name() {
        assert!(!is_valid_state("California"));
        assert!(!is_valid_state(""));
        assert!(!is_valid_state("ZZ"));
    }

    #[test]
    fn test_phone_plain_ten_digits() {
        assert!(is_valid_phone("4155552671"));
    }

    #[test]
    fn test_phone_with_country_code() {
        assert!(is_valid_phone("+14155552671"));
        assert!(is_valid_phone("14155552671"));
    }

    #[test]
    fn test_phone_ten_digits_starting_with_one() {
        // matches the documented format as 10 plain digits
        assert!(is_valid_phone("1234567890"));
    }

    #[test]
    fn test_phone_too_short() {
        assert!(!is_valid_phone("123"));
    }

    #[test]
    fn test_phone_rejects_letters_and_dashes() {
        assert!(!is_valid_phone("555-123-4567"));
        assert!(!is_valid_phone("415555abcd"));
    }

    #[test]
    fn test_zipcode_five_digit() {
        assert!(is_valid_zipcode("90210"));
    }

    #[test]
    fn test_zipcode_plus_four() {
        assert!(is_valid_zipcode("40502-1234"));
    }

    #[test]
    fn test_zipcode_rejects_letters() {
        assert!(!is_valid_zipcode("abcde"));
        assert!(!is_valid_zipcode("9021"));
        assert!(!is_valid_zipcode("90210-12"));
    }

    #[test]
    fn test_email_basic() {
        assert!(is_valid_email("test@church.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@church.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn test_title_case_trims_and_cases() {
        assert_eq!(title_case("  grace fellowship church "), "Grace Fellowship Church");
        assert_eq!(title_case("LEXINGTON"), "Lexington");
    }
}
