use anyhow::{Context, Result, bail};
use serde_json::from_str;
use solana_sdk::{
    signature::{Keypair, Signer},
    signer::SeedDerivable,
};
use std::fs::read_to_string;

/// Parse a keypair from the JSON byte-array format written by `solana-keygen`.
pub fn parse_keypair_json(contents: &str) -> Result<Keypair> {
    let keypair_data: Vec<u8> = from_str(contents).context("Failed to parse keypair JSON")?;

    if keypair_data.len() != 64 {
        bail!(
            "Invalid keypair length: expected 64 bytes, got {}",
            keypair_data.len()
        );
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&keypair_data[..32]);

    let keypair = Keypair::from_seed(&seed)
        .map_err(|e| anyhow::anyhow!("Failed to create keypair from seed: {}", e))?;

    // second half must be the public key derived from the seed
    if keypair.pubkey().as_ref() != &keypair_data[32..] {
        bail!("Keypair public key does not match its secret key");
    }

    Ok(keypair)
}

pub fn load_keypair_from_file(path: &str) -> Result<Keypair> {
    let contents =
        read_to_string(path).with_context(|| format!("Failed to read keypair file: {}", path))?;
    parse_keypair_json(&contents)
}

/// Load the signing credential when one is configured.
pub fn load_signer(path: Option<&str>) -> Result<Option<Keypair>> {
    path.map(load_keypair_from_file).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keygen_format() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();

        let parsed = parse_keypair_json(&json).unwrap();
        assert_eq!(parsed.pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_wrong_length() {
        let err = parse_keypair_json("[1,2,3]").unwrap_err();
        assert!(err.to_string().contains("Invalid keypair length"));
    }

    #[test]
    fn rejects_mismatched_public_half() {
        let mut bytes = Keypair::new().to_bytes().to_vec();
        bytes[40] ^= 0xff;
        let json = serde_json::to_string(&bytes).unwrap();

        assert!(parse_keypair_json(&json).is_err());
    }

    #[test]
    fn no_path_means_no_signer() {
        assert!(load_signer(None).unwrap().is_none());
    }
}
