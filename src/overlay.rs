use anyhow::{Context, Result};
use serde::Deserialize;

use crate::prefs::PreferenceStore;

/// Placeholder shown until the first status event arrives.
pub const STATE_CONNECTING: &str = "connecting";
/// Sentinel set by the error handler when the stream goes down.
pub const STATE_STREAM_DOWN: &str = "sbt-is-down";

pub const STATE_COMPILING: &str = "compiling";
pub const STATE_COMPILE_ERROR: &str = "compile-error";
pub const STATE_RUNNING: &str = "running";
pub const STATE_ASSET_CHANGED: &str = "asset-changed";

/// Wire payload of one status event. Only `state` is consumed; the server
/// may send additional fields and may send state strings not listed above.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadDecision {
    Stay,
    Reload,
}

/// What the renderer needs: the text label, the style class (always the
/// current state string), and which variant of the auto-reload glyph to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub class: String,
    pub auto_reload: bool,
}

/// Tracks the dev server's last reported state and the auto-reload
/// preference, and decides when a state transition warrants a full reload.
///
/// One instance per host; mutated only from the host's event loop.
pub struct StatusOverlay {
    state: String,
    auto_reload: bool,
}

impl StatusOverlay {
    pub fn new(auto_reload: bool) -> Self {
        Self {
            state: STATE_CONNECTING.to_string(),
            auto_reload,
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn auto_reload(&self) -> bool {
        self.auto_reload
    }

    /// Apply one status event. The reload decision is computed against the
    /// state held *before* this event, then the new state is stored.
    ///
    /// A malformed payload returns `Err` and leaves the state untouched; the
    /// failure is scoped to that single event.
    pub fn observe_message(&mut self, payload: &str) -> Result<ReloadDecision> {
        let payload: StatusPayload =
            serde_json::from_str(payload).context("malformed status payload")?;
        let decision = self.reload_decision(&payload.state);
        self.state = payload.state;
        Ok(decision)
    }

    /// Stream-level failure is a state, not an error: downgrade the display
    /// and keep listening. Never triggers a reload.
    pub fn observe_stream_error(&mut self) {
        self.state = STATE_STREAM_DOWN.to_string();
    }

    /// Invert the preference and persist it. The in-memory flag flips even if
    /// the write fails, so the caller can surface the error and the user can
    /// toggle again to re-sync.
    pub fn toggle_auto_reload(&mut self, prefs: &PreferenceStore) -> Result<()> {
        self.auto_reload = !self.auto_reload;
        prefs.set_auto_reload(self.auto_reload)
    }

    pub fn badge(&self) -> Badge {
        Badge {
            label: self.state.clone(),
            class: self.state.clone(),
            auto_reload: self.auto_reload,
        }
    }

    /// Reload when a compile cycle just finished and the server is back up,
    /// or when a static asset changed. Gated entirely by the preference.
    fn reload_decision(&self, new_state: &str) -> ReloadDecision {
        if !self.auto_reload {
            return ReloadDecision::Stay;
        }

        let after_compile = (self.state == STATE_COMPILING || self.state == STATE_COMPILE_ERROR)
            && new_state == STATE_RUNNING;
        let asset_changed = new_state == STATE_ASSET_CHANGED;

        if after_compile || asset_changed {
            ReloadDecision::Reload
        } else {
            ReloadDecision::Stay
        }
    }
}
