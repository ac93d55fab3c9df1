//! Throwaway SSH keypairs for tests.
//!
//! Keys are emitted in the same text forms real users have: an
//! authorized-key line for the public half, an OpenSSH or PKCS#1 PEM file
//! for the private half.

use rand_core::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use ssh_key::private::{KeypairData, RsaKeypair};
use ssh_key::public::{KeyData, RsaPublicKey};
use ssh_key::{Algorithm, LineEnding, Mpint, PrivateKey, PublicKey};
use std::sync::LazyLock;

const RSA_BITS: usize = 2048;
const COMMENT: &str = "test@tgzx";

/// A generated keypair in SSH text formats.
#[derive(Clone, Debug)]
pub struct TestKey {
    /// `ssh-… <base64> <comment>` line, as served by a key listing.
    pub public_line: String,
    /// PEM private key file contents.
    pub private_pem: String,
}

struct RsaFixture {
    openssh: TestKey,
    pkcs1: TestKey,
}

static RSA: LazyLock<RsaFixture> = LazyLock::new(|| {
    let private = RsaPrivateKey::new(&mut OsRng, RSA_BITS).expect("RSA key generation must succeed");
    let pkcs1_pem = private
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .expect("PKCS#1 encoding must succeed")
        .to_string();

    let keypair = RsaKeypair::try_from(private).expect("RSA key must convert");
    let key = PrivateKey::new(KeypairData::from(keypair), COMMENT).expect("RSA key must wrap");
    let openssh = openssh_pair(&key);
    let pkcs1 = TestKey {
        public_line: openssh.public_line.clone(),
        private_pem: pkcs1_pem,
    };
    RsaFixture { openssh, pkcs1 }
});

/// Generates a fresh Ed25519 keypair in OpenSSH format.
pub fn ed25519_key() -> TestKey {
    let mut key =
        PrivateKey::random(&mut OsRng, Algorithm::Ed25519).expect("Ed25519 generation must succeed");
    key.set_comment(COMMENT);
    openssh_pair(&key)
}

/// A 2048-bit RSA keypair in OpenSSH format, generated once per process.
pub fn rsa_key() -> TestKey {
    RSA.openssh.clone()
}

/// The same keypair as [`rsa_key`], with the private half as PKCS#1 PEM.
pub fn rsa_pkcs1_key() -> TestKey {
    RSA.pkcs1.clone()
}

/// An `ssh-rsa` public key line with a modulus of `bits` bits.
///
/// Built from the raw key parts, so sizes that key generators refuse to
/// emit as SSH keys can still be offered to the parser.
pub fn rsa_public_line(bits: usize) -> String {
    let private = RsaPrivateKey::new(&mut OsRng, bits).expect("RSA key generation must succeed");
    let public = RsaPublicKey {
        e: Mpint::from_positive_bytes(&private.e().to_bytes_be()).expect("exponent must encode"),
        n: Mpint::from_positive_bytes(&private.n().to_bytes_be()).expect("modulus must encode"),
    };
    PublicKey::new(KeyData::Rsa(public), COMMENT)
        .to_openssh()
        .expect("public key must encode")
}

fn openssh_pair(key: &PrivateKey) -> TestKey {
    TestKey {
        public_line: key.public_key().to_openssh().expect("public key must encode"),
        private_pem: key
            .to_openssh(LineEnding::LF)
            .expect("private key must encode")
            .to_string(),
    }
}
