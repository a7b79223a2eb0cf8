// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Environment transactions
//!
//! A transaction is a scoped checkout of an Environment. Mutations go
//! straight to the Environment; the transaction keeps a snapshot taken when
//! it began.
//!
//! - [`EnvironmentTransaction::commit`] keeps the mutations. With cleanup,
//!   every locally derived concept added or replaced since the snapshot is
//!   removed, or restored verbatim if the snapshot had one at that address.
//! - [`EnvironmentTransaction::rollback`] restores the snapshot.
//! - Dropping an unfinished transaction rolls back.
//!
//! ```rust
//! use trilogy_studio_ir::{Concept, DataType, Purpose, DEFAULT_NAMESPACE};
//! use trilogy_studio_semantic::Environment;
//!
//! let mut env = Environment::default();
//! let mut tx = env.begin();
//! tx.declare_concept(
//!     Concept::new("total", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Metric).locally_derived(),
//! );
//! let cleaned = tx.commit(true);
//!
//! assert_eq!(cleaned, vec!["local.total".to_string()]);
//! assert!(env.concept("local.total").is_none());
//! ```

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::Environment;

/// Scoped checkout of an Environment
#[derive(Debug)]
pub struct EnvironmentTransaction<'env> {
    env: &'env mut Environment,
    snapshot: Option<Environment>,
}

impl Environment {
    /// Start a transaction over this Environment
    pub fn begin(&mut self) -> EnvironmentTransaction<'_> {
        let snapshot = self.clone();
        EnvironmentTransaction {
            env: self,
            snapshot: Some(snapshot),
        }
    }
}

impl EnvironmentTransaction<'_> {
    /// Keep the mutations, optionally cleaning up locally derived concepts
    ///
    /// Returns the addresses that were cleaned up.
    pub fn commit(mut self, cleanup: bool) -> Vec<String> {
        let Some(snapshot) = self.snapshot.take() else {
            return Vec::new();
        };
        if !cleanup {
            return Vec::new();
        }

        let changed: Vec<String> = self
            .env
            .concepts
            .iter()
            .filter(|(address, concept)| {
                concept.locally_derived && snapshot.concepts.get(*address) != Some(*concept)
            })
            .map(|(address, _)| address.clone())
            .collect();

        for address in &changed {
            match snapshot.concepts.get(address) {
                Some(previous) => {
                    debug!(address = %address, "restoring concept replaced by a local definition");
                    self.env.restore_concept(previous.clone());
                }
                None => {
                    debug!(address = %address, "removing locally derived concept");
                    self.env.remove_concept(address);
                }
            }
        }

        let kept = snapshot.overrides.len();
        let mut index = 0;
        self.env.overrides.retain(|o| {
            index += 1;
            index <= kept || !changed.contains(&o.address)
        });
        changed
    }

    /// Discard every mutation made since the transaction began
    pub fn rollback(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.env = snapshot;
        }
    }
}

impl Deref for EnvironmentTransaction<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        self.env
    }
}

impl DerefMut for EnvironmentTransaction<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        self.env
    }
}

impl Drop for EnvironmentTransaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            warn!("environment transaction dropped without commit, rolling back");
            *self.env = snapshot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilogy_studio_ir::{Concept, DEFAULT_NAMESPACE, DataType, Purpose};

    fn local(name: &str, datatype: DataType) -> Concept {
        Concept::new(name, DEFAULT_NAMESPACE, datatype, Purpose::Property).locally_derived()
    }

    #[test]
    fn test_commit_without_cleanup_keeps_local_concepts() {
        let mut env = Environment::default();
        let mut tx = env.begin();
        tx.declare_concept(local("x", DataType::Integer));
        assert!(tx.commit(false).is_empty());
        assert!(env.concept("local.x").is_some());
    }

    #[test]
    fn test_cleanup_restores_previous_local_definition() {
        let mut env = Environment::default();
        env.declare_concept(local("x", DataType::Integer));

        let mut tx = env.begin();
        tx.declare_concept(local("x", DataType::String));
        assert_eq!(tx.commit(true), vec!["local.x".to_string()]);

        assert_eq!(env.concept("local.x").unwrap().datatype, DataType::Integer);
        assert!(env.overrides().is_empty());
    }

    #[test]
    fn test_cleanup_keeps_top_level_declarations() {
        let mut env = Environment::default();
        let mut tx = env.begin();
        tx.declare_concept(Concept::new("p", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Constant));
        tx.declare_concept(local("y", DataType::Integer));
        tx.commit(true);

        assert!(env.concept("local.p").is_some());
        assert!(env.concept("local.y").is_none());
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut env = Environment::default();
        env.declare_concept(Concept::new("id", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Key));

        let mut tx = env.begin();
        tx.remove_concept("local.id");
        tx.declare_concept(Concept::new("other", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Key));
        tx.rollback();

        assert!(env.concept("local.id").is_some());
        assert!(env.concept("local.other").is_none());
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut env = Environment::default();
        {
            let mut tx = env.begin();
            tx.declare_concept(Concept::new("id", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Key));
        }
        assert!(env.concepts().is_empty());
    }
}
