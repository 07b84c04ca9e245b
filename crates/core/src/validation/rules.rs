//! Single-field rules. Each returns the message to show, or `Ok`.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern")
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern"));

pub type RuleResult = Result<(), String>;

pub fn required(value: &str) -> RuleResult {
    if value.trim().is_empty() {
        Err("This field is required".to_string())
    } else {
        Ok(())
    }
}

pub fn max_length(value: &str, max: usize) -> RuleResult {
    if value.chars().count() > max {
        Err(format!("Must be at most {} characters", max))
    } else {
        Ok(())
    }
}

/// Parse a numeric text input and check it against `min`.
pub fn number_at_least(value: &str, min: f64) -> Result<f64, String> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| "Must be a number".to_string())?;
    if !number.is_finite() {
        return Err("Must be a number".to_string());
    }
    if number < min {
        return Err(format!("Must be at least {}", min));
    }
    Ok(number)
}

pub fn email(value: &str) -> RuleResult {
    if EMAIL.is_match(value.trim()) {
        Ok(())
    } else {
        Err("Enter a valid email address".to_string())
    }
}

pub fn url(value: &str) -> RuleResult {
    if URL.is_match(value.trim()) {
        Ok(())
    } else {
        Err("Enter a valid URL".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(required("x").is_ok());
        assert!(required("").is_err());
        assert!(required("   ").is_err());
    }

    #[test]
    fn test_max_length_counts_chars() {
        assert!(max_length("héllo", 5).is_ok());
        assert!(max_length("héllo!", 5).is_err());
    }

    #[test]
    fn test_number_at_least() {
        assert_eq!(number_at_least("0", 0.0), Ok(0.0));
        assert_eq!(number_at_least(" 12.5 ", 0.0), Ok(12.5));
        assert!(number_at_least("-1", 0.0).is_err());
        assert!(number_at_least("abc", 0.0).is_err());
        assert!(number_at_least("NaN", 0.0).is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("someone@example.com").is_ok());
        assert!(email("first.last+tag@mail.example.org").is_ok());
        assert!(email("someone@").is_err());
        assert!(email("no-at-sign.com").is_err());
        assert!(email("a@b").is_err());
    }

    #[test]
    fn test_url() {
        assert!(url("https://example.com/page?x=1").is_ok());
        assert!(url("http://localhost:3000").is_ok());
        assert!(url("ftp://example.com").is_err());
        assert!(url("example.com").is_err());
    }
}
