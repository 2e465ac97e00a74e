//! Authenticated-identity signal.
//!
//! The engine only reads this; signing in and out happens elsewhere.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::session::Section;

/// "Is there a currently known identity for this section?"
pub trait IdentitySignal: Send + Sync {
    fn has_identity(&self, section: Section) -> bool;
}

impl<F> IdentitySignal for F
where
    F: Fn(Section) -> bool + Send + Sync,
{
    fn has_identity(&self, section: Section) -> bool {
        self(section)
    }
}

/// Shared set of sections with a signed-in identity. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct KnownIdentities {
    sections: Arc<RwLock<HashSet<Section>>>,
}

impl KnownIdentities {
    /// No identities signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `sections` signed in.
    pub fn with(sections: impl IntoIterator<Item = Section>) -> Self {
        let identities = Self::new();
        for section in sections {
            identities.sign_in(section);
        }
        identities
    }

    /// Record a signed-in identity for `section`.
    pub fn sign_in(&self, section: Section) {
        self.sections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(section);
    }

    /// Forget the identity for `section`.
    pub fn sign_out(&self, section: Section) {
        self.sections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&section);
    }

    /// Forget every identity (full logout).
    pub fn sign_out_all(&self) {
        self.sections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl IdentitySignal for KnownIdentities {
    fn has_identity(&self, section: Section) -> bool {
        self.sections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&section)
    }
}
