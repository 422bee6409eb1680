use validator::ValidationError;
use zxcvbn::zxcvbn;

const MIN_LENGTH: usize = 10;
const MAX_LENGTH: usize = 256;
const MIN_STRENGTH_SCORE: u8 = 3;

/// Words an attacker would try first against this site's admin.
const SITE_WORDS: [&str; 6] = ["admin", "portfolio", "printing", "print", "cad", "model"];

fn rejection(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Admin passwords need an uppercase letter, a digit, a symbol and a
/// zxcvbn score of at least 3.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(rejection(
            "password_length",
            format!("Must be between {} and {} characters", MIN_LENGTH, MAX_LENGTH),
        ));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(has_upper && has_digit && has_symbol) {
        return Err(rejection(
            "password_complexity",
            "Must include an uppercase letter, a number and a symbol".to_string(),
        ));
    }

    let estimate = zxcvbn(password, &SITE_WORDS);
    if (estimate.score() as u8) < MIN_STRENGTH_SCORE {
        let feedback = estimate
            .feedback()
            .and_then(|f| f.warning().map(|w| w.to_string()))
            .unwrap_or_else(|| "Password is too easy to guess".to_string());
        return Err(rejection("password_strength", feedback));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(validate_password_strength("Sl1c3r&Nozzle#Bed").is_ok());
    }

    #[test]
    fn short_password_fails_on_length() {
        let err = validate_password_strength("Ab1!").unwrap_err();
        assert_eq!(err.code, "password_length");
    }

    #[test]
    fn missing_symbol_fails_on_complexity() {
        let err = validate_password_strength("Nozzle12345Bed").unwrap_err();
        assert_eq!(err.code, "password_complexity");
    }

    #[test]
    fn site_words_are_weak() {
        let err = validate_password_strength("Portfolio1!").unwrap_err();
        assert_eq!(err.code, "password_strength");
    }
}
