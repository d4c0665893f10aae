//! Translate drag-and-drop results into panel permutations.
//!
//! Pointer and keyboard sensors live in the host UI; they report either an
//! index move or the ids of the dragged panel and the panel it was dropped
//! over. Both are turned into a full id order for
//! [`PanelRegistry::reorder`](crate::panels::PanelRegistry::reorder).

use crate::error::WorkspaceError;
use crate::panels::PanelId;

/// Move the element at `from` to `to`, shifting the ones in between.
///
/// # Returns
/// `None` when `from == to` (nothing to do), otherwise the new order.
///
/// # Errors
/// Returns [`WorkspaceError::IndexOutOfRange`] when either index is past the
/// end of `order`.
pub fn move_index(
    order: &[PanelId],
    from: usize,
    to: usize,
) -> Result<Option<Vec<PanelId>>, WorkspaceError> {
    for index in [from, to] {
        if index >= order.len() {
            return Err(WorkspaceError::IndexOutOfRange {
                index,
                len: order.len(),
            });
        }
    }
    if from == to {
        return Ok(None);
    }
    let mut next = order.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Ok(Some(next))
}

/// Resolve a drag-end report (`active` dropped over `over`) into a new order.
///
/// A drop outside any panel (`over = None`) or onto itself is a no-op.
///
/// # Errors
/// Returns [`WorkspaceError::PanelNotFound`] when either id is not in `order`.
pub fn drag_end_order(
    order: &[PanelId],
    active: &PanelId,
    over: Option<&PanelId>,
) -> Result<Option<Vec<PanelId>>, WorkspaceError> {
    let Some(over) = over else {
        return Ok(None);
    };
    if active == over {
        return Ok(None);
    }
    let from = index_of(order, active)?;
    let to = index_of(order, over)?;
    move_index(order, from, to)
}

fn index_of(order: &[PanelId], id: &PanelId) -> Result<usize, WorkspaceError> {
    order
        .iter()
        .position(|candidate| candidate == id)
        .ok_or_else(|| WorkspaceError::PanelNotFound(id.clone()))
}
