//! Per-flow state machine and the scoped busy state that guards it.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::{
    error::FlowError,
    surface::{Control, Element, Surface},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Generation,
    Export,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Generation => f.write_str("generation"),
            FlowKind::Export => f.write_str("export"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Busy,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct FlowSlot {
    kind: FlowKind,
    state: Mutex<FlowState>,
}

impl FlowSlot {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            state: Mutex::new(FlowState::Idle),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn state(&self) -> FlowState {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_enter(&self) -> Result<(), FlowError> {
        let mut state = self.lock();
        if *state == FlowState::Busy {
            return Err(FlowError::Busy { flow: self.kind });
        }
        *state = FlowState::Busy;
        Ok(())
    }

    fn settle(&self, outcome: FlowState) {
        *self.lock() = outcome;
    }
}

/// Busy state held for the lifetime of one flow run.
///
/// Acquiring flips the slot to `Busy` and puts the surface into its busy shape. Dropping
/// restores the loading indicator and the control on every exit path, including early
/// returns, panics, and the flow future being dropped mid-request.
pub(crate) struct BusyGuard<'a> {
    slot: &'a FlowSlot,
    surface: &'a dyn Surface,
    control: Control,
    succeeded: bool,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn acquire(
        slot: &'a FlowSlot,
        surface: &'a dyn Surface,
        control: Control,
        loading_message: &str,
    ) -> Result<Self, FlowError> {
        slot.try_enter()?;
        debug!(flow = %slot.kind(), "flow entered busy state");

        surface.set_loading_message(loading_message);
        surface.set_visible(Element::Loading, true);
        surface.set_control(control, false, control.busy_label());

        Ok(Self {
            slot,
            surface,
            control,
            succeeded: false,
        })
    }

    pub(crate) fn succeed(&mut self) {
        self.succeeded = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_visible(Element::Loading, false);
        self.surface
            .set_control(self.control, true, self.control.idle_label());

        let outcome = if self.succeeded {
            FlowState::Done
        } else {
            FlowState::Failed
        };
        self.slot.settle(outcome);
        debug!(flow = %self.slot.kind(), state = ?outcome, "flow left busy state");
    }
}
