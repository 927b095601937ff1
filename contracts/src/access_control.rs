//! Access Control
//!
//! Single-admin authorization policy embedded as a submodule by the engine
//! and the synthetic token. Every gated entry point compares the calling
//! identity with the stored admin.
//!
//! Admin handover is two-step: the current admin nominates a successor with
//! `transfer_admin`, the successor completes it with `accept_admin`.

use odra::prelude::*;
use crate::errors::EngineError;

/// Admin handover started
#[odra::event]
pub struct AdminTransferStarted {
    pub current_admin: Address,
    pub pending_admin: Address,
}

/// Admin handover completed
#[odra::event]
pub struct AdminTransferred {
    pub previous_admin: Address,
    pub new_admin: Address,
}

/// Authorization policy
#[odra::module(events = [AdminTransferStarted, AdminTransferred])]
pub struct AccessControl {
    /// Current admin
    admin: Var<Address>,
    /// Nominated successor, if any
    pending_admin: Var<Option<Address>>,
}

#[odra::module]
impl AccessControl {
    /// Initialize with the first admin
    pub fn init(&mut self, admin: Address) {
        if self.admin.get().is_some() {
            self.env().revert(EngineError::AlreadyConfigured);
        }
        self.admin.set(admin);
        self.pending_admin.set(None);
    }

    /// Current admin, if initialized
    pub fn admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Nominated successor
    pub fn pending_admin(&self) -> Option<Address> {
        self.pending_admin.get().flatten()
    }

    pub fn is_admin(&self, account: Address) -> bool {
        self.admin.get() == Some(account)
    }

    /// Revert unless the caller is the admin
    pub fn require_admin(&self) {
        if !self.is_admin(self.env().caller()) {
            self.env().revert(EngineError::Unauthorized);
        }
    }

    /// Nominate a new admin (admin only). Overwrites any earlier nomination.
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.pending_admin.set(Some(new_admin));
        self.env().emit_event(AdminTransferStarted {
            current_admin: self.env().caller(),
            pending_admin: new_admin,
        });
    }

    /// Complete a handover (nominee only)
    pub fn accept_admin(&mut self) {
        let caller = self.env().caller();
        match self.pending_admin() {
            Some(pending) if pending == caller => {}
            _ => self.env().revert(EngineError::NoPendingAdmin),
        }

        let previous_admin = match self.admin.get() {
            Some(admin) => admin,
            None => self.env().revert(EngineError::Unauthorized),
        };

        self.admin.set(caller);
        self.pending_admin.set(None);
        self.env().emit_event(AdminTransferred {
            previous_admin,
            new_admin: caller,
        });
    }
}
