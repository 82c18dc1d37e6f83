use rand::Rng;

/// Six-digit completion code handed to the customer at booking time and
/// checked by the worker on-site. Uniform over [100000, 999999]; per-booking
/// scope, not a cryptographic token.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{code:06}")
}
