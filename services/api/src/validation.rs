//! Input validation utilities

/// Validate an email address shape without pulling in a full parser.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a review rating
pub fn validate_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }

    Ok(())
}

/// Validate a requested cart quantity and narrow it to the store's
/// integer column. Zero is allowed; it means "remove the row".
pub fn validate_quantity(quantity: u32) -> Result<i32, String> {
    i32::try_from(quantity).map_err(|_| "Quantity is too large".to_string())
}

/// Validate a category or product name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name must be at most 100 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(validate_email("buyer@example.com").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn quantity_must_fit_the_stock_column() {
        assert_eq!(validate_quantity(0), Ok(0));
        assert_eq!(validate_quantity(3), Ok(3));
        assert_eq!(validate_quantity(i32::MAX as u32), Ok(i32::MAX));
        assert!(validate_quantity(i32::MAX as u32 + 1).is_err());
    }

    #[test]
    fn names_must_be_present_and_short() {
        assert!(validate_name("Electronics").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }
}
