// Payout account key material
//
// The secret phrase lives in a per-network dot file next to the job
// (`.polkadot`, `.kusama`, ...). It is read once, turned into an sr25519
// keypair and wiped; only the keypair is handed to the chain client.

use std::{fs, io::ErrorKind, path::Path};

use subxt_signer::{bip39::Mnemonic, sr25519::Keypair};
use tracing::info;
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Read the secret phrase from `path`, trimmed
pub fn load_seed(path: &Path) -> Result<Zeroizing<String>, KeyError> {
    let display = path.display().to_string();

    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => KeyError::NotFound(display.clone()),
        _ => KeyError::Unreadable {
            path: display.clone(),
            message: e.to_string(),
        },
    })?;
    let contents = Zeroizing::new(contents);

    let phrase = Zeroizing::new(contents.trim().to_string());
    if phrase.is_empty() {
        return Err(KeyError::Empty(display));
    }

    Ok(phrase)
}

/// Derive the signing keypair from a BIP-39 phrase (no derivation path, no password)
pub fn derive_signer(phrase: &str) -> Result<Keypair, KeyError> {
    let mnemonic =
        Mnemonic::parse(phrase).map_err(|e| KeyError::InvalidPhrase(e.to_string()))?;

    let keypair =
        Keypair::from_phrase(&mnemonic, None).map_err(|e| KeyError::InvalidPhrase(e.to_string()))?;

    info!(
        "🔑 Payout account loaded: {}",
        keypair.public_key().to_account_id()
    );

    Ok(keypair)
}
