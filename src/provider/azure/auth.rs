//! # Azure Authentication
//!
//! Builds the service-principal credential used for ARM requests.

use azure_core::credentials::{Secret, TokenCredential};
use azure_identity::ClientSecretCredential;
use std::sync::Arc;
use tracing::debug;

use super::AzureApiCredentials;

/// Create a service-principal credential from the credential document.
///
/// Construction is local; the first token request happens on the first ARM
/// call. Note: credential constructors return `Arc<dyn TokenCredential>`.
pub fn client_secret_credential(
    document: &AzureApiCredentials,
) -> azure_core::Result<Arc<dyn TokenCredential>> {
    debug!(
        tenant_id = %document.tenant_id,
        client_id = %document.client_id,
        "Creating Azure client secret credential"
    );
    let credential = ClientSecretCredential::new(
        &document.tenant_id,
        document.client_id.clone(),
        Secret::new(document.client_secret.clone()),
        None,
    )?;
    Ok(credential)
}
