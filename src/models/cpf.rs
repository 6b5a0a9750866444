//! Checksum verification for CPF numbers (the Brazilian national tax id).
//!
//! A CPF carries nine base digits plus two weighted mod-11 check digits.
//! Punctuation is ignored, so `529.982.247-25` and `52998224725` are the
//! same number.

/// Returns true when `input` contains exactly eleven digits whose check
/// digits match. Runs of a single repeated digit satisfy the arithmetic but
/// are never assigned, so they are rejected too.
pub fn is_valid(input: &str) -> bool {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }
    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted mod-11 check digit over `digits`, weights counting down from
/// `digits.len() + 1` to 2. A remainder of 10 folds to 0.
fn check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=digits.len() as u32 + 1).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    sum * 10 % 11 % 10
}
