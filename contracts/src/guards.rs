//! Pause switch and reentrancy lock used by the engine's mutating entry points.

use odra::prelude::*;
use crate::errors::EngineError;

/// System paused
#[odra::event]
pub struct Paused {
    pub by: Address,
}

/// System resumed
#[odra::event]
pub struct Unpaused {
    pub by: Address,
}

/// Binary paused / active flag
#[odra::module(events = [Paused, Unpaused])]
pub struct PauseGuard {
    paused: Var<bool>,
}

#[odra::module]
impl PauseGuard {
    pub fn is_paused(&self) -> bool {
        self.paused.get().unwrap_or(false)
    }

    pub fn require_not_paused(&self) {
        if self.is_paused() {
            self.env().revert(EngineError::SystemPaused);
        }
    }

    /// Pause; callers must have checked authorization. Idempotent.
    pub fn pause(&mut self) {
        if self.is_paused() {
            return;
        }
        self.paused.set(true);
        self.env().emit_event(Paused { by: self.env().caller() });
    }

    /// Resume; callers must have checked authorization. Idempotent.
    pub fn unpause(&mut self) {
        if !self.is_paused() {
            return;
        }
        self.paused.set(false);
        self.env().emit_event(Unpaused { by: self.env().caller() });
    }
}

/// Call-scope lock held for the whole entry point, nested
/// collaborator calls included.
#[odra::module]
pub struct ReentrancyGuard {
    locked: Var<bool>,
}

#[odra::module]
impl ReentrancyGuard {
    pub fn is_locked(&self) -> bool {
        self.locked.get().unwrap_or(false)
    }

    pub fn enter(&mut self) {
        if self.is_locked() {
            self.env().revert(EngineError::ReentrantCall);
        }
        self.locked.set(true);
    }

    pub fn exit(&mut self) {
        self.locked.set(false);
    }
}
