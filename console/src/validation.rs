//! Local input validation. Everything here runs before any backend call.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ConsoleError, ConsoleResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_MONIKER_LENGTH: usize = 70;
pub const MAX_WALLET_NAME_LENGTH: usize = 50;
/// Smallest self-delegation accepted when creating a validator, in TKFY.
pub const MIN_STAKE: u64 = 200_000;
pub const MAX_COMMISSION_PERCENT: f64 = 20.0;

static WALLET_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}\s\-_]+$").expect("wallet name pattern is valid"));

static MALICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"<script",
        r"javascript:",
        r"data:text/html",
        r"vbscript:",
        r"onload=",
        r"onerror=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("security pattern is valid"))
    .collect()
});

/// First-run password: minimum length and matching confirmation.
pub fn validate_new_password(password: &str, confirmation: &str) -> ConsoleResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ConsoleError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password != confirmation {
        return Err(ConsoleError::ValidationError(
            "Passwords do not match".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_wallet_name(name: &str) -> ConsoleResult<()> {
    check_basic_security(name)?;

    if name.trim().is_empty() {
        return Err(ConsoleError::ValidationError(
            "Enter a name for the wallet".to_string(),
        ));
    }
    if name.chars().count() > MAX_WALLET_NAME_LENGTH {
        return Err(ConsoleError::ValidationError(
            "Wallet name too long".to_string(),
        ));
    }
    if !WALLET_NAME_PATTERN.is_match(name) {
        return Err(ConsoleError::ValidationError(
            "Wallet name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Collapse runs of whitespace so pasted phrases import cleanly.
pub fn normalize_mnemonic(mnemonic: &str) -> ConsoleResult<String> {
    let normalized = mnemonic.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(ConsoleError::ValidationError(
            "Enter the recovery phrase".to_string(),
        ));
    }
    Ok(normalized)
}

pub fn validate_moniker(moniker: &str) -> ConsoleResult<()> {
    if moniker.trim().is_empty() {
        return Err(ConsoleError::InvalidMoniker(
            "enter a name for the node".to_string(),
        ));
    }
    if moniker.chars().count() > MAX_MONIKER_LENGTH {
        return Err(ConsoleError::InvalidMoniker(format!(
            "must be at most {} characters",
            MAX_MONIKER_LENGTH
        )));
    }
    if moniker.chars().any(char::is_control) {
        return Err(ConsoleError::InvalidMoniker(
            "must not contain control characters".to_string(),
        ));
    }
    check_basic_security(moniker)
}

/// Parse a commission percentage and check it lies in `[0, 20]`.
pub fn parse_commission_percent(input: &str) -> ConsoleResult<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ConsoleError::InvalidCommission(format!("'{}' is not a number", input)))?;
    if !value.is_finite() || !(0.0..=MAX_COMMISSION_PERCENT).contains(&value) {
        return Err(ConsoleError::InvalidCommission(
            "custom commission must be between 0% and 20%".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a whole-token stake amount and enforce `MIN_STAKE`.
pub fn parse_stake(input: &str) -> ConsoleResult<u64> {
    let trimmed = input.trim();
    let value: u64 = trimmed.parse().map_err(|_| {
        ConsoleError::InvalidStake(format!("'{}' is not a whole number of TKFY", input))
    })?;
    if value < MIN_STAKE {
        return Err(ConsoleError::InvalidStake(format!(
            "minimum stake is {} TKFY",
            MIN_STAKE
        )));
    }
    Ok(value)
}

fn check_basic_security(input: &str) -> ConsoleResult<()> {
    if input.len() > 1000 {
        return Err(ConsoleError::ValidationError("Input too long".to_string()));
    }

    let lowered = input.to_lowercase();
    if MALICIOUS_PATTERNS.iter().any(|p| p.is_match(&lowered)) {
        return Err(ConsoleError::ValidationError(
            "Input contains potentially malicious content".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_password_rules() {
        assert!(validate_new_password("12345", "12345").is_err());
        assert!(validate_new_password("123456", "123457").is_err());
        assert!(validate_new_password("123456", "123456").is_ok());
    }

    #[test]
    fn commission_bounds() {
        assert!(matches!(
            parse_commission_percent("-1"),
            Err(ConsoleError::InvalidCommission(_))
        ));
        assert!(matches!(
            parse_commission_percent("25"),
            Err(ConsoleError::InvalidCommission(_))
        ));
        assert!(parse_commission_percent("abc").is_err());
        assert!(parse_commission_percent("NaN").is_err());
        assert_eq!(parse_commission_percent("0").unwrap(), 0.0);
        assert_eq!(parse_commission_percent(" 20 ").unwrap(), 20.0);
        assert_eq!(parse_commission_percent("8.5").unwrap(), 8.5);
    }

    #[test]
    fn stake_minimum() {
        assert!(matches!(
            parse_stake("199999"),
            Err(ConsoleError::InvalidStake(_))
        ));
        assert_eq!(parse_stake("200000").unwrap(), 200_000);
        assert!(parse_stake("200000.5").is_err());
        assert!(parse_stake("").is_err());
    }

    #[test]
    fn moniker_rules() {
        assert!(validate_moniker("").is_err());
        assert!(validate_moniker("   ").is_err());
        assert!(validate_moniker("alfa-nova-star").is_ok());
        assert!(validate_moniker(&"x".repeat(71)).is_err());
        assert!(validate_moniker("bad\nname").is_err());
        assert!(validate_moniker("<script>alert(1)</script>").is_err());
    }

    #[test]
    fn wallet_names() {
        assert!(validate_wallet_name("Main wallet_01").is_ok());
        assert!(validate_wallet_name("Carteira Principal").is_ok());
        assert!(validate_wallet_name("").is_err());
        assert!(validate_wallet_name("semi;colon").is_err());
        assert!(validate_wallet_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn mnemonic_is_normalized() {
        assert_eq!(
            normalize_mnemonic("  abandon \n ability\table  ").unwrap(),
            "abandon ability able"
        );
        assert!(normalize_mnemonic(" \n ").is_err());
    }
}
