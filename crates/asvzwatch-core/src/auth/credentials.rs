use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "asvzwatch";

pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for an account email in the OS keychain
    pub fn store(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the password for an account email from the OS keychain
    pub fn get_password(email: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for an account email
    pub fn delete(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }
}
