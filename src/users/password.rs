use bcrypt::{BcryptError, DEFAULT_COST};
use tracing::error;

/// Hash a plaintext password into a self-describing bcrypt string (cost 12).
/// The salt is generated per call, so hashing the same input twice yields
/// different secrets.
pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    bcrypt::hash(plain, DEFAULT_COST)
}

/// Check a plaintext password against a stored secret. A malformed secret
/// counts as a mismatch, it never raises.
pub fn verify_password(plain: &str, secret: &str) -> bool {
    match bcrypt::verify(plain, secret) {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "bcrypt verify error");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let password = "pw1";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn verify_is_false_on_malformed_secret() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }
}
