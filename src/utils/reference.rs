use rand::distr::Alphanumeric;
use rand::{rng, Rng};

/// Human-readable transaction reference, e.g. `TXN-8F2KQ0ZA`.
pub fn generate_reference() -> String {
    let code: String = rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("TXN-{}", code)
}
