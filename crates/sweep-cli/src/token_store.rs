use anyhow::Context;
use keyring::Entry;

const SERVICE: &str = "repo-sweep";
const ACCOUNT: &str = "pull-token";

/// Reads the stored pull token. A missing entry is `Ok(None)`.
pub fn get_token() -> anyhow::Result<Option<String>> {
    let entry = Entry::new(SERVICE, ACCOUNT).context("open keyring entry")?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err).context("read token from keyring"),
    }
}

pub fn set_token(token: &str) -> anyhow::Result<()> {
    let entry = Entry::new(SERVICE, ACCOUNT).context("open keyring entry")?;
    entry.set_password(token).context("write token to keyring")
}

/// Returns whether an entry existed.
pub fn clear_token() -> anyhow::Result<bool> {
    let entry = Entry::new(SERVICE, ACCOUNT).context("open keyring entry")?;
    match entry.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(err).context("delete token from keyring"),
    }
}
