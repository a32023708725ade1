//! Capability negotiation.
//!
//! The caller lists the protocol extensions it understands as
//! `capability[]` lines. The helper answers with the subset it also
//! supports, and only uses an extension when the caller declared it.

use std::collections::HashSet;

use crate::protocol::{CredentialSet, AUTHTYPE_KEY, CAPABILITY_KEY};

/// Capabilities this helper implements.
pub const SUPPORTED_CAPABILITIES: &[&str] = &[AUTHTYPE_KEY];

/// Whether the helper implements `capability`.
pub fn is_supported(capability: &str) -> bool {
    SUPPORTED_CAPABILITIES.contains(&capability)
}

/// Record the caller's capabilities and narrow the echoed list.
///
/// Returns every capability the caller declared. The `capability[]` entry of
/// `creds` is rewritten to the declared capabilities this helper supports,
/// in the caller's order; it is removed if none remain.
pub fn negotiate_capabilities(creds: &mut CredentialSet) -> HashSet<String> {
    let declared: HashSet<String> = creds.get(CAPABILITY_KEY).iter().cloned().collect();

    let mut echoed: Vec<String> = Vec::new();
    for capability in creds.get(CAPABILITY_KEY) {
        if is_supported(capability) && !echoed.contains(capability) {
            echoed.push(capability.clone());
        }
    }

    creds.set(CAPABILITY_KEY, echoed);
    declared
}
