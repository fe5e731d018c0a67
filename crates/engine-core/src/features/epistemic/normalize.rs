//! Claim-key normalization so that visually-identical but differently-encoded
//! strings (e.g. precomposed vs. combining-accent forms) unify under
//! evidence-ledger lookups.

use unicode_normalization::UnicodeNormalization;

/// NFC-normalizes, trims, and lowercases `s` so it can be used as a stable
/// map key for claim identity.
pub fn normalize_claim_key(s: &str) -> String {
    s.trim().nfc().collect::<String>().to_lowercase()
}
