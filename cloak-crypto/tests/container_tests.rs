use cloak_crypto::{
    decode_params, decrypt, encrypt, CryptoError, EncryptOptions, EncryptedSecret,
};
use pretty_assertions::assert_eq;

// Keep derivation fast in tests; the default work factor is exercised once.
fn fast() -> EncryptOptions {
    EncryptOptions { iterations: 1000 }
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let plaintext = b"some secret markup <b>hidden</b>";
    let secret = encrypt(plaintext, "passphrase", &fast()).unwrap();
    let recovered = decrypt(&secret.bytes, "passphrase", &secret.params).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn roundtrip_with_decoded_params() {
    let secret = encrypt(b"payload", "passphrase", &fast()).unwrap();
    let params = decode_params(&secret.params).unwrap();
    let recovered = decrypt(&secret.bytes, "passphrase", &params).unwrap();
    assert_eq!(recovered, b"payload");
}

#[test]
fn example_vector_correct_horse() {
    let secret = encrypt(b"hello", "correct-horse", &fast()).unwrap();
    let recovered = decrypt(&secret.bytes, "correct-horse", &secret.params).unwrap();
    assert_eq!(recovered, b"hello");

    let err = decrypt(&secret.bytes, "wrong-horse", &secret.params).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn empty_plaintext_roundtrip() {
    let secret = encrypt(b"", "passphrase", &fast()).unwrap();
    let recovered = decrypt(&secret.bytes, "passphrase", &secret.params).unwrap();
    assert_eq!(recovered, b"");
}

#[test]
fn all_byte_values_roundtrip() {
    let plaintext: Vec<u8> = (0..=255).collect();
    let secret = encrypt(&plaintext, "passphrase", &fast()).unwrap();
    let recovered = decrypt(&secret.bytes, "passphrase", &secret.params).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn large_plaintext_roundtrip() {
    let plaintext = vec![0x42u8; 128 * 1024];
    let secret = encrypt(&plaintext, "passphrase", &fast()).unwrap();
    let recovered = decrypt(&secret.bytes, "passphrase", &secret.params).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn default_iteration_count_roundtrip() {
    let secret = encrypt(b"hello", "correct-horse", &EncryptOptions::default()).unwrap();
    let params = decode_params(&secret.params).unwrap();
    assert_eq!(params.iterations, 100_000);
    assert_eq!(
        decrypt(&secret.bytes, "correct-horse", &secret.params).unwrap(),
        b"hello"
    );
}

#[test]
fn each_encryption_is_unique() {
    let a = encrypt(b"same plaintext", "same password", &fast()).unwrap();
    let b = encrypt(b"same plaintext", "same password", &fast()).unwrap();

    // Fresh salt and iv every call
    assert_ne!(a.bytes, b.bytes);
    assert_ne!(a.params, b.params);

    let pa = decode_params(&a.params).unwrap();
    let pb = decode_params(&b.params).unwrap();
    assert_ne!(pa.salt, pb.salt);
    assert_ne!(pa.iv, pb.iv);

    assert_eq!(decrypt(&a.bytes, "same password", &a.params).unwrap(), b"same plaintext");
    assert_eq!(decrypt(&b.bytes, "same password", &b.params).unwrap(), b"same plaintext");
}

#[test]
fn generated_params_have_expected_sizes() {
    let secret = encrypt(b"x", "pw", &fast()).unwrap();
    let params = decode_params(&secret.params).unwrap();
    assert_eq!(params.salt.len(), cloak_crypto::SALT_SIZE);
    assert_eq!(params.iv.len(), cloak_crypto::IV_SIZE);
    assert_eq!(params.iterations, 1000);
}

#[test]
fn ciphertext_carries_appended_tag() {
    let secret = encrypt(b"hello", "pw", &fast()).unwrap();
    assert_eq!(secret.bytes.len(), b"hello".len() + cloak_crypto::TAG_SIZE);
}

#[test]
fn zero_iterations_surfaces_key_derivation_error() {
    let err = encrypt(b"x", "pw", &EncryptOptions { iterations: 0 }).unwrap_err();
    assert!(matches!(err, CryptoError::KeyDerivation(_)));
}

#[test]
fn container_serialization_roundtrip() {
    let secret = encrypt(b"serialize me", "pw", &fast()).unwrap();
    let json = serde_json::to_string(&secret).unwrap();
    let deserialized: EncryptedSecret = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.bytes, secret.bytes);
    assert_eq!(deserialized.params, secret.params);
    assert_eq!(
        decrypt(&deserialized.bytes, "pw", &deserialized.params).unwrap(),
        b"serialize me"
    );
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn always_roundtrips(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            password in "[ -~]{0,24}",
        ) {
            let secret = encrypt(&plaintext, &password, &fast()).unwrap();
            let recovered = decrypt(&secret.bytes, &password, &secret.params).unwrap();
            prop_assert_eq!(recovered, plaintext);
        }
    }
}
