//! Login request signing.
//!
//! A login body is signed either with a local PKCS#8 RSA key or by an
//! external [`KeyManager`]. Both produce the base64 (standard alphabet)
//! encoding of an RSASSA-PKCS1-v1_5 signature over SHA-512 of the body.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{ObjectIdentifier, PrivateKeyInfo, SecretDocument};
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha512;

use crate::error::{AuthError, AuthResult};
use crate::ports::KeyManager;

/// Signs `body` with a PEM encoded PKCS#8 RSA private key.
///
/// # Errors
///
/// - [`AuthError::Decode`] if the input is not a PEM block
/// - [`AuthError::Parse`] if the block is not a PKCS#8 private key
/// - [`AuthError::UnsupportedKeyType`] if the key is not RSA
/// - [`AuthError::Signing`] if the signature cannot be computed
pub fn sign_with_key(body: &[u8], private_key_pem: &[u8]) -> AuthResult<String> {
    let key = parse_private_key(private_key_pem)?;
    let signing_key = SigningKey::<Sha512>::new(key);
    let signature = signing_key
        .try_sign(body)
        .map_err(|e| AuthError::Signing(e.to_string()))?;

    Ok(STANDARD.encode(signature.to_bytes()))
}

/// Delegates signing of `body` to an external key manager.
///
/// # Errors
///
/// Returns [`AuthError::NoSignerAvailable`] without doing any work when
/// `signer` is `None`, and [`AuthError::ExternalSigner`] wrapping the
/// signer's own error when it fails.
pub async fn sign_externally(body: &[u8], signer: Option<&dyn KeyManager>) -> AuthResult<String> {
    let Some(signer) = signer else {
        return Err(AuthError::NoSignerAvailable);
    };

    signer.sign(body).await.map_err(AuthError::ExternalSigner)
}

/// Decodes a PEM encoded PKCS#8 private key and checks that it is RSA.
///
/// # Errors
///
/// Same decoding errors as [`sign_with_key`].
pub fn parse_private_key(private_key_pem: &[u8]) -> AuthResult<RsaPrivateKey> {
    let pem = std::str::from_utf8(private_key_pem)
        .map_err(|e| AuthError::Decode(format!("key is not valid UTF-8: {e}")))?;

    let (_label, document) =
        SecretDocument::from_pem(pem.trim()).map_err(|e| AuthError::Decode(e.to_string()))?;

    let info = PrivateKeyInfo::try_from(document.as_bytes())
        .map_err(|e| AuthError::Parse(e.to_string()))?;

    if info.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(AuthError::UnsupportedKeyType(algorithm_name(
            info.algorithm.oid,
        )));
    }

    RsaPrivateKey::try_from(info).map_err(|e| AuthError::Parse(e.to_string()))
}

fn algorithm_name(oid: ObjectIdentifier) -> String {
    let name = match oid.to_string().as_str() {
        "1.2.840.10045.2.1" => "EC",
        "1.3.101.112" => "Ed25519",
        "1.3.101.113" => "Ed448",
        "1.2.840.10040.4.1" => "DSA",
        "1.2.840.113549.1.1.10" => "RSA-PSS",
        _ => return format!("algorithm {oid}"),
    };
    format!("{name} ({oid})")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::KeyManagerError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::Verifier;

    const RSA_KEY: &[u8] = include_bytes!("../../testdata/rsa_private_key.pem");
    const RSA_PKCS1_KEY: &[u8] = include_bytes!("../../testdata/rsa_pkcs1_private_key.pem");
    const EC_KEY: &[u8] = include_bytes!("../../testdata/ec_private_key.pem");

    fn verify(body: &[u8], signature: &str) -> bool {
        let pem = std::str::from_utf8(RSA_KEY).unwrap();
        let key = RsaPrivateKey::from_pkcs8_pem(pem).unwrap();
        let verifying_key = VerifyingKey::<Sha512>::new(key.to_public_key());
        let bytes = STANDARD.decode(signature).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        verifying_key.verify(body, &signature).is_ok()
    }

    #[test]
    fn test_signature_verifies_with_public_key() {
        let bodies: [&[u8]; 3] = [
            b"",
            br#"{"login":"example-user","nonce":"98475920834"}"#,
            &[0_u8, 159, 146, 150, 255],
        ];

        for body in bodies {
            let signature = sign_with_key(body, RSA_KEY).unwrap();
            assert!(verify(body, &signature), "signature did not verify");
            // 2048 bit key
            assert_eq!(STANDARD.decode(&signature).unwrap().len(), 256);
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let body = b"same body";
        assert_eq!(
            sign_with_key(body, RSA_KEY).unwrap(),
            sign_with_key(body, RSA_KEY).unwrap()
        );
    }

    #[test]
    fn test_signature_does_not_verify_other_body() {
        let signature = sign_with_key(b"original", RSA_KEY).unwrap();
        assert!(!verify(b"tampered", &signature));
    }

    #[test]
    fn test_non_pem_input_is_decode_error() {
        let result = sign_with_key(b"body", b"this is not a private key");
        assert!(matches!(result, Err(AuthError::Decode(_))));

        let result = sign_with_key(b"body", &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_pkcs1_key_is_parse_error() {
        let result = sign_with_key(b"body", RSA_PKCS1_KEY);
        assert!(matches!(result, Err(AuthError::Parse(_))));
    }

    #[test]
    fn test_ec_key_is_unsupported() {
        match sign_with_key(b"body", EC_KEY) {
            Err(AuthError::UnsupportedKeyType(name)) => assert!(name.starts_with("EC")),
            other => panic!("expected UnsupportedKeyType, got {other:?}"),
        }
    }

    struct RecordingKeyManager {
        bodies: Mutex<Vec<Vec<u8>>>,
        fail: bool,
    }

    #[async_trait]
    impl KeyManager for RecordingKeyManager {
        async fn sign(&self, body: &[u8]) -> Result<String, KeyManagerError> {
            self.bodies.lock().push(body.to_vec());
            if self.fail {
                Err(KeyManagerError::new("vault sealed"))
            } else {
                Ok("c2lnbmF0dXJl".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_sign_externally_without_signer() {
        let result = sign_externally(b"body", None).await;
        assert!(matches!(result, Err(AuthError::NoSignerAvailable)));
    }

    #[tokio::test]
    async fn test_sign_externally_delegates() {
        let manager = RecordingKeyManager {
            bodies: Mutex::new(Vec::new()),
            fail: false,
        };
        let signature = sign_externally(b"login body", Some(&manager)).await.unwrap();
        assert_eq!(signature, "c2lnbmF0dXJl");
        assert_eq!(manager.bodies.lock().as_slice(), [b"login body".to_vec()]);
    }

    #[tokio::test]
    async fn test_sign_externally_surfaces_signer_error() {
        let manager = RecordingKeyManager {
            bodies: Mutex::new(Vec::new()),
            fail: true,
        };
        match sign_externally(b"body", Some(&manager)).await {
            Err(AuthError::ExternalSigner(e)) => assert_eq!(e.to_string(), "vault sealed"),
            other => panic!("expected ExternalSigner, got {other:?}"),
        }
    }
}
