// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Identity-preserving reconciliation of record snapshots.
//!
//! The layout engine and the sub-views hold handles to individual records and write into them
//! (positions, velocities). Replacing a record object behind their back silently detaches them,
//! so incoming snapshots are merged into the existing objects instead:
//!
//! - [`same_ids`] decides whether two collections describe the same set of records.
//! - [`reconcile_object`] merges fields of one object into another, recursing into nested objects.
//! - [`reconcile_collection`] merges a whole collection by id, falling back to wholesale
//!   replacement when the id sets diverge.

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use crate::model::{RecordId, SharedObject, Value};

/// A record with a merge key.
pub trait Identified {
    type Id: Eq + Hash;

    fn record_id(&self) -> Self::Id;
}

/// A record that can absorb a newer version of itself without changing identity.
pub trait MergeInPlace {
    fn merge_in_place(&mut self, incoming: Self);
}

impl Identified for SharedObject {
    type Id = Option<RecordId>;

    fn record_id(&self) -> Self::Id {
        self.borrow().get("id").and_then(RecordId::from_value)
    }
}

impl MergeInPlace for SharedObject {
    fn merge_in_place(&mut self, incoming: Self) {
        reconcile_object(self, &incoming);
    }
}

/// Returns whether both id sequences contain the same ids, ignoring order and duplicates.
///
/// An empty sequence never matches a non-empty one.
pub fn same_ids<T, A, B>(ids_a: A, ids_b: B) -> bool
where
    T: Eq + Hash,
    A: IntoIterator<Item = T>,
    B: IntoIterator<Item = T>,
{
    let set_a = ids_a.into_iter().collect::<HashSet<_>>();
    let set_b = ids_b.into_iter().collect::<HashSet<_>>();

    if set_a.is_empty() != set_b.is_empty() {
        return false;
    }

    set_a == set_b
}

/// Merges every field of `new` into `old` and returns `old`.
///
/// When a field holds an object on both sides the merge recurses and the old nested object is
/// kept. Anything else (scalars, arrays, an object replacing a scalar) is overwritten. Fields that
/// only exist in `old` are left alone.
///
/// `new` may share objects with `old`, including `old` itself. Both sides are expected to be
/// acyclic.
pub fn reconcile_object(old: &SharedObject, new: &SharedObject) -> SharedObject {
    if Rc::ptr_eq(old, new) {
        return Rc::clone(old);
    }

    let incoming = new
        .borrow()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Vec<_>>();
    for (key, value) in incoming {
        let nested = match (old.borrow().get(&key), &value) {
            (Some(Value::Object(existing)), Value::Object(update)) => {
                Some((Rc::clone(existing), Rc::clone(update)))
            }
            _ => None,
        };

        match nested {
            Some((existing, update)) => {
                reconcile_object(&existing, &update);
            }
            None => {
                old.borrow_mut().insert(key, value);
            }
        }
    }

    Rc::clone(old)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Records were merged into the existing collection; surviving records kept their identity.
    Merged { updated: usize, appended: usize, removed: usize },
    /// The id sets diverged and the old collection was dropped in favor of the new one.
    Replaced,
}

/// Reconciles `old` towards `new` by record id.
///
/// If the id sets differ, `old` is replaced wholesale. Otherwise each new record is merged into the
/// first old record with the same id (or appended), and old records whose id no longer appears
/// are removed, keeping the relative order of the survivors.
///
/// Ids are expected to be unique. Duplicates are tolerated: the first matching old record wins.
pub fn reconcile_collection<R>(old: &mut Vec<R>, new: Vec<R>) -> CollectionOutcome
where
    R: Identified + MergeInPlace,
{
    let old_ids = old.iter().map(Identified::record_id).collect::<Vec<_>>();
    let new_ids = new.iter().map(Identified::record_id).collect::<Vec<_>>();

    if !same_ids(old_ids.iter(), new_ids.iter()) {
        debug!(old_len = old.len(), new_len = new.len(), "record ids diverged; replacing collection");
        *old = new;
        return CollectionOutcome::Replaced;
    }

    let incoming = new_ids.into_iter().collect::<HashSet<_>>();
    if incoming.len() != new.len() || old_ids.len() != old_ids.iter().collect::<HashSet<_>>().len()
    {
        debug!("duplicate record ids; first match wins");
    }

    let mut updated = 0;
    let mut appended = 0;
    for record in new {
        let id = record.record_id();
        match old.iter().position(|existing| existing.record_id() == id) {
            Some(slot) => {
                old[slot].merge_in_place(record);
                updated += 1;
            }
            None => {
                old.push(record);
                appended += 1;
            }
        }
    }

    let before = old.len();
    old.retain(|existing| incoming.contains(&existing.record_id()));
    let removed = before - old.len();

    CollectionOutcome::Merged { updated, appended, removed }
}
