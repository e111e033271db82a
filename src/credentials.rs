//! # Credential Extraction
//!
//! Turns a ProviderConfig credential source into raw credential bytes.
//!
//! Extraction is call-local: every Connect re-reads the source, so rotated
//! credentials are picked up on the next reconciliation without restarts.
//! Buffers are wiped on drop.

use k8s_openapi::api::core::v1::Secret;
use kube::{api::Api, Client};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crd::CredentialSource;

/// Errors while resolving credential bytes from the configured source
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot get secret {namespace}/{name}: {source}")]
    GetSecret {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },
    #[error("secret {name} has no data key {key}")]
    MissingKey { name: String, key: String },
    #[error("cannot read environment variable {variable}: {source}")]
    Environment {
        variable: String,
        #[source]
        source: std::env::VarError,
    },
    #[error("cannot read credential file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Extract raw credential bytes from the configured origin
pub async fn extract(
    client: &Client,
    source: &CredentialSource,
) -> Result<Zeroizing<Vec<u8>>, CredentialsError> {
    match source {
        CredentialSource::Secret { secret_ref } => {
            let secrets: Api<Secret> = Api::namespaced(client.clone(), &secret_ref.namespace);
            let secret = secrets.get(&secret_ref.name).await.map_err(|source| {
                CredentialsError::GetSecret {
                    name: secret_ref.name.clone(),
                    namespace: secret_ref.namespace.clone(),
                    source,
                }
            })?;
            secret_data_key(secret, &secret_ref.name, &secret_ref.key)
        }
        CredentialSource::Environment { variable } => extract_environment(variable),
        CredentialSource::Filesystem { path } => extract_file(path).await,
    }
}

fn secret_data_key(
    secret: Secret,
    name: &str,
    key: &str,
) -> Result<Zeroizing<Vec<u8>>, CredentialsError> {
    let value = secret
        .data
        .unwrap_or_default()
        .remove(key)
        .ok_or_else(|| CredentialsError::MissingKey {
            name: name.to_string(),
            key: key.to_string(),
        })?;
    Ok(Zeroizing::new(value.0))
}

fn extract_environment(variable: &str) -> Result<Zeroizing<Vec<u8>>, CredentialsError> {
    let value = std::env::var(variable).map_err(|source| CredentialsError::Environment {
        variable: variable.to_string(),
        source,
    })?;
    Ok(Zeroizing::new(value.into_bytes()))
}

async fn extract_file(path: &str) -> Result<Zeroizing<Vec<u8>>, CredentialsError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CredentialsError::Read {
            path: path.to_string(),
            source,
        })?;
    Ok(Zeroizing::new(bytes))
}
