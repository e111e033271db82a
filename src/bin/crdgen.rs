//! # CRD Generator
//!
//! Generates Kubernetes CustomResourceDefinition YAML from the Rust type
//! definitions in the library.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > config/crd/appservice.octopilot.io.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;

use publishing_profile_controller::crd::{ProviderConfig, ProviderConfigUsage, PublishingProfile};

fn main() {
    let crds = [
        PublishingProfile::crd(),
        ProviderConfig::crd(),
        ProviderConfigUsage::crd(),
    ];

    for crd in crds {
        match serde_yaml::to_string(&crd) {
            Ok(yaml) => {
                println!("---");
                print!("{yaml}");
            }
            Err(e) => {
                eprintln!("Failed to serialize CRD to YAML: {e}");
                std::process::exit(1);
            }
        }
    }
}
