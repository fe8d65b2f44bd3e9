use sha2::{Digest, Sha256};

/// Alphabet for short codes (no `I` or `O`)
const SHORT_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const SHORT_CODE_LEN: usize = 5;

/// Category that gets the `RC` prefix; everything else is `RH`
pub const CRACK_CATEGORY: &str = "도로균열";

/// Deterministic 5-character code derived from a public id
pub fn short_code(public_id: &str) -> String {
    let digest = Sha256::digest(public_id.as_bytes());
    digest
        .iter()
        .take(SHORT_CODE_LEN)
        .map(|b| SHORT_CODE_ALPHABET[*b as usize % SHORT_CODE_ALPHABET.len()] as char)
        .collect()
}

/// Display id shown in the defect list, e.g. `RC-0042-7KQ2M`
pub fn display_id(category: &str, damage_id: i64, public_id: &str) -> String {
    let prefix = if category == CRACK_CATEGORY { "RC" } else { "RH" };
    format!("{}-{:04}-{}", prefix, damage_id, short_code(public_id))
}
