//! Per-mount session state for a page shell.
//!
//! Every page that consumes the gate walks the same machine:
//!
//! ```text
//! Init ──begin_check──▶ Checking ──resolve──▶ Authenticated
//!                                  ├────────▶ Unauthenticated   (tolerant)
//!                                  └────────▶ Redirecting       (strict)
//! ```
//!
//! A remount starts over from `Init`; nothing is carried between mounts.

use serde::Serialize;

use crate::gate::SessionGate;
use crate::navigation::Navigator;
use crate::storage::KeyValueStore;
use crate::types::{GateMode, SessionResult, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountState {
    /// Mounted, no check issued yet.
    Init,
    /// Check dispatched, result not yet applied.
    Checking,
    Authenticated(UserId),
    /// Tolerant page without a session.
    Unauthenticated,
    /// Strict page without a session; waiting for the login navigation.
    Redirecting,
}

/// What the page renders for its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum PageView {
    /// "Loading…" placeholder.
    Loading,
    Content {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// Logged-out variant of a tolerant page.
    LoggedOut,
    /// Null render while a redirect is in flight. Protected content must
    /// never show here.
    Nothing,
}

#[derive(Debug, Clone)]
pub struct PageMount {
    mode: GateMode,
    state: MountState,
    mounted: bool,
}

impl PageMount {
    #[must_use]
    pub fn new(mode: GateMode) -> Self {
        Self {
            mode,
            state: MountState::Init,
            mounted: true,
        }
    }

    #[must_use]
    pub fn mode(&self) -> GateMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> &MountState {
        &self.state
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Move `Init → Checking`. Returns `false` (and changes nothing) from any
    /// other state or after unmount.
    pub fn begin_check(&mut self) -> bool {
        if !self.mounted || self.state != MountState::Init {
            return false;
        }
        self.state = MountState::Checking;
        true
    }

    /// Apply a check result. Ignored unless the mount is live and `Checking`.
    pub fn resolve(&mut self, result: SessionResult) {
        if !self.mounted {
            tracing::trace!("Session result arrived after unmount, discarded");
            return;
        }
        if self.state != MountState::Checking {
            return;
        }

        self.state = match (result, self.mode) {
            (SessionResult::Authenticated { user_id }, _) => MountState::Authenticated(user_id),
            (SessionResult::Unauthenticated, GateMode::Strict) => MountState::Redirecting,
            (SessionResult::Unauthenticated, GateMode::Tolerant) => MountState::Unauthenticated,
        };
    }

    /// Run the whole mount-time check against `gate` in this page's mode.
    pub fn run<S: KeyValueStore, N: Navigator>(&mut self, gate: &SessionGate<S, N>) -> &MountState {
        if self.begin_check() {
            let result = gate.check(self.mode);
            self.resolve(result);
        }
        &self.state
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Mount again (e.g. a layout re-rendering on child route change).
    pub fn remount(&mut self) {
        self.mounted = true;
        self.state = MountState::Init;
    }

    #[must_use]
    pub fn view(&self) -> PageView {
        match &self.state {
            MountState::Init | MountState::Checking => PageView::Loading,
            MountState::Authenticated(user_id) => PageView::Content {
                user_id: user_id.clone(),
            },
            MountState::Unauthenticated => PageView::LoggedOut,
            MountState::Redirecting => PageView::Nothing,
        }
    }
}
