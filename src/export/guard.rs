//! Scoped presentation overrides on the shared layout container.
//!
//! [`apply_override`] patches the container's style and markers and returns
//! an [`OverrideGuard`]. The prior style and markers come back either on
//! [`OverrideGuard::restore`] or when the guard is dropped, so an early
//! return, a `?`, a panic, or a dropped future all leave the container as
//! it was.
//!
//! Only one override may own a container at a time. Nested overrides would
//! each capture the other's state and restore out of order, so a second
//! [`apply_override`] is rejected with [`Error::ExportInProgress`] until the
//! first guard is released.

use std::sync::MutexGuard;

use log::{debug, warn};

use crate::surfaces::{Flow, LayoutContainer, LayoutStyle, SharedContainer};
use crate::{Error, Result};

/// Fields left `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverride {
    pub flow: Option<Flow>,
    pub gap: Option<u32>,
    pub surface_width: Option<u32>,
    pub add_markers: Vec<String>,
}

impl StyleOverride {
    /// Force every surface into one row.
    pub fn single_row(gap: u32, marker: &str) -> Self {
        Self {
            flow: Some(Flow::Row),
            gap: Some(gap),
            surface_width: None,
            add_markers: vec![marker.to_string()],
        }
    }

    fn apply(&self, style: &mut LayoutStyle, markers: &mut Vec<String>) {
        if let Some(flow) = self.flow {
            style.flow = flow;
        }
        if let Some(gap) = self.gap {
            style.gap = gap;
        }
        if let Some(width) = self.surface_width {
            style.surface_width = width;
        }
        for m in &self.add_markers {
            if !markers.contains(m) {
                markers.push(m.clone());
            }
        }
    }
}

#[must_use = "dropping the guard restores the layout immediately"]
pub struct OverrideGuard {
    container: SharedContainer,
    prior_style: LayoutStyle,
    prior_markers: Vec<String>,
    restored: bool,
}

pub fn apply_override(container: &SharedContainer, patch: &StyleOverride) -> Result<OverrideGuard> {
    let mut c = container
        .lock()
        .map_err(|_| Error::Other("layout container lock poisoned".into()))?;
    if c.override_active {
        warn!("layout override on '{}' rejected: another override is active", c.id);
        return Err(Error::ExportInProgress);
    }
    let prior_style = c.style.clone();
    let prior_markers = c.markers.clone();
    let LayoutContainer { style, markers, .. } = &mut *c;
    patch.apply(style, markers);
    c.override_active = true;
    debug!("layout override applied to '{}': {:?}", c.id, c.style.flow);
    drop(c);

    Ok(OverrideGuard {
        container: container.clone(),
        prior_style,
        prior_markers,
        restored: false,
    })
}

impl OverrideGuard {
    /// Current container state with the override in place
    pub fn snapshot(&self) -> LayoutContainer {
        lock_ignoring_poison(&self.container).clone()
    }

    /// Reinstate the prior style and markers.
    pub fn restore(mut self) {
        self.restore_inner();
    }

    fn restore_inner(&mut self) {
        if self.restored {
            return;
        }
        let mut c = lock_ignoring_poison(&self.container);
        c.style = self.prior_style.clone();
        c.markers = self.prior_markers.clone();
        c.override_active = false;
        self.restored = true;
        debug!("layout override on '{}' restored", c.id);
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        if !self.restored {
            warn!("layout override dropped without explicit restore; restoring");
            self.restore_inner();
        }
    }
}

// Restoration must still happen after a panic poisoned the lock.
fn lock_ignoring_poison(container: &SharedContainer) -> MutexGuard<'_, LayoutContainer> {
    container.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
