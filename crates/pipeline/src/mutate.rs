//! Random prompt mutation.
//!
//! A leaf utility with no internal state: callers decide whether and when to
//! invoke it (evidence below the quality threshold, or a tripped integrity
//! check treated as worth a remediation attempt).

use rand::Rng;

/// Number of characters appended by one mutation.
pub const MUTATION_LEN: usize = 5;

/// Alphabet the suffix is drawn from: ASCII letters, digits, and two marker
/// symbols.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789*#";

/// Appends [`MUTATION_LEN`] random characters to `prompt`.
///
/// Deterministic only in length; the suffix content differs per call. No
/// uniqueness or collision guarantees.
pub fn mutate_prompt(prompt: &str) -> String {
    let mut rng = rand::rng();
    let mut mutated = String::with_capacity(prompt.len() + MUTATION_LEN);
    mutated.push_str(prompt);
    for _ in 0..MUTATION_LEN {
        mutated.push(CHARSET[rng.random_range(0..CHARSET.len())] as char);
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_adds_exactly_five_characters() {
        for prompt in ["", "freedom", "Analyze X post"] {
            let mutated = mutate_prompt(prompt);
            assert_eq!(mutated.chars().count(), prompt.chars().count() + MUTATION_LEN);
        }
    }

    #[test]
    fn mutation_preserves_the_prefix() {
        let mutated = mutate_prompt("freedom");
        assert!(mutated.starts_with("freedom"));
    }

    #[test]
    fn suffix_is_drawn_from_the_fixed_charset() {
        let mutated = mutate_prompt("q");
        for c in mutated.chars().skip(1) {
            assert!(CHARSET.contains(&(c as u8)), "unexpected suffix char {c:?}");
        }
    }
}
