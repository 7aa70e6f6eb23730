use rand::Rng;

/// Minimum length accepted for new passwords.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a plaintext password for storage. Called explicitly at every write
/// boundary (registration, reset); nothing hashes implicitly on save.
pub fn hash_password(plaintext: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
}

/// Verify a plaintext password against a stored hash. A comparison failure
/// and a malformed hash are both reported as a mismatch.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Generate a high-entropy password reset token: 32 random bytes as hex.
pub fn generate_reset_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
