//! One-way reconciliation between two card stores.
//!
//! Each operation moves data from a source store toward a destination
//! store and only talks to them through [`CardStore`]. How the
//! operations are combined is up to the caller; see [`crate::plan`].

use crate::error::{Error, Result};
use crate::store::CardStore;
use crate::types::CardId;
use std::collections::HashSet;
use tracing::info;

/// Delete cards whose ids are in `target` but not in `base`.
///
/// A card missing from the base is taken to have been deleted there.
/// Returns the number of cards deleted.
pub fn delete_extra_cards<B, T>(base: &B, target: &mut T) -> usize
where
    B: CardStore + ?Sized,
    T: CardStore + ?Sized,
{
    let keep: HashSet<CardId> = base.ids().into_iter().flatten().collect();
    let extra: Vec<CardId> = target
        .ids()
        .into_iter()
        .flatten()
        .filter(|id| !keep.contains(id))
        .collect();
    let deleted = target.delete_cards(&extra);
    info!(count = deleted, "cards deleted");
    deleted
}

/// Overwrite destination cards with the source card of the same id.
///
/// Returns the number of ids present on both sides.
pub fn update<S, D>(source: &S, destination: &mut D) -> Result<usize>
where
    S: CardStore + ?Sized,
    D: CardStore + ?Sized,
{
    let matched: Vec<CardId> = source
        .ids()
        .into_iter()
        .flatten()
        .filter(|id| destination.contains(*id))
        .collect();
    for &id in &matched {
        let card = source.get_card(id).ok_or(Error::CardNotFound(id))?;
        destination.update_card(card)?;
    }
    info!(count = matched.len(), "cards updated");
    Ok(matched.len())
}

/// Copy source cards whose ids the destination lacks.
///
/// Normal syncs never need this; it recovers stores that drifted apart.
/// Returns the number of cards copied.
pub fn copy_unmatched_ided_cards<S, D>(source: &S, destination: &mut D) -> Result<usize>
where
    S: CardStore + ?Sized,
    D: CardStore + ?Sized,
{
    let unmatched: Vec<CardId> = source
        .ids()
        .into_iter()
        .flatten()
        .filter(|id| !destination.contains(*id))
        .collect();
    for &id in &unmatched {
        let card = source.get_card(id).ok_or(Error::CardNotFound(id))?;
        destination.add_card(card)?;
    }
    info!(
        count = unmatched.len(),
        "unmatched ided cards copied from source to destination"
    );
    Ok(unmatched.len())
}

/// Give ids to the source's new cards, then add them to the destination.
///
/// Returns the ids assigned, in order.
pub fn mark_and_add_new_cards<S, D>(source: &mut S, destination: &mut D) -> Result<Vec<CardId>>
where
    S: CardStore + ?Sized,
    D: CardStore + ?Sized,
{
    let new_ids = source.mark_blank_ids()?;
    for &id in &new_ids {
        let card = source.get_card(id).ok_or(Error::CardNotFound(id))?;
        destination.add_card(card)?;
    }
    info!(count = new_ids.len(), "cards added");
    Ok(new_ids)
}
