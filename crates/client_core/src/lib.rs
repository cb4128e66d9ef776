//! Client-side presentation state for the landing page.
//!
//! A single [`OverlayController`] owns the drawer state machine: at most one
//! bottom-sheet drawer is open at a time, trigger and dismiss inputs are
//! messages dispatched to the controller, and the host acts on the effects
//! it returns. All transitions are synchronous reactions to discrete input
//! events on the UI thread.

pub mod events;

use shared::domain::{DrawerId, ProjectSummary};
use tracing::debug;

pub use events::{CleanupTicket, DismissReason, OverlayEffect, OverlayInput, TriggerId};

/// Downward travel, in pixels, past which releasing a drag dismisses the
/// drawer instead of snapping it back.
pub const DEFAULT_RELEASE_THRESHOLD_PX: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Open(DrawerId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDraft {
    pub body: String,
    pub reply_to: String,
}

/// Transient body of the open drawer, rebuilt from scratch on every open.
/// Nothing in here survives a dismissal or a drawer switch.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawerBody {
    Work {
        projects: Vec<ProjectSummary>,
        expanded: Option<usize>,
    },
    Contact(MessageDraft),
}

pub struct OverlayController {
    state: OverlayState,
    body: Option<DrawerBody>,
    opened_by: Option<TriggerId>,
    drag_offset: f32,
    release_threshold: f32,
    pending_cleanup: Option<CleanupTicket>,
    next_ticket: u64,
    projects: Vec<ProjectSummary>,
}

impl OverlayController {
    pub fn new(projects: Vec<ProjectSummary>) -> Self {
        Self::with_release_threshold(projects, DEFAULT_RELEASE_THRESHOLD_PX)
    }

    pub fn with_release_threshold(projects: Vec<ProjectSummary>, threshold_px: f32) -> Self {
        Self {
            state: OverlayState::Closed,
            body: None,
            opened_by: None,
            drag_offset: 0.0,
            release_threshold: threshold_px,
            pending_cleanup: None,
            next_ticket: 0,
            projects,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn open_drawer(&self) -> Option<DrawerId> {
        match self.state {
            OverlayState::Open(drawer) => Some(drawer),
            OverlayState::Closed => None,
        }
    }

    pub fn body(&self) -> Option<&DrawerBody> {
        self.body.as_ref()
    }

    pub fn drag_offset(&self) -> f32 {
        self.drag_offset
    }

    pub fn has_pending_cleanup(&self) -> bool {
        self.pending_cleanup.is_some()
    }

    /// Single entry point: every trigger and dismiss input is a message
    /// dispatched here. The returned effects tell the host what to do.
    pub fn dispatch(&mut self, input: OverlayInput) -> Vec<OverlayEffect> {
        match input {
            OverlayInput::Activate {
                trigger,
                drawer_slug,
            } => self.activate(trigger, &drawer_slug),
            OverlayInput::Dismiss(reason) => self.close(reason),
            OverlayInput::DragBy(dy) => {
                if self.open_drawer().is_some() {
                    self.drag_offset = (self.drag_offset + dy).max(0.0);
                }
                Vec::new()
            }
            OverlayInput::ReleaseDrag => self.release_drag(),
            OverlayInput::CleanupFinished(ticket) => {
                if self.pending_cleanup == Some(ticket) {
                    self.pending_cleanup = None;
                } else {
                    debug!(ticket = ticket.0, "ignoring stale exit cleanup");
                }
                Vec::new()
            }
            OverlayInput::DraftEdited(text) => {
                if let Some(DrawerBody::Contact(draft)) = self.body.as_mut() {
                    draft.body = text;
                }
                Vec::new()
            }
            OverlayInput::ToggleProject(index) => {
                if let Some(DrawerBody::Work { projects, expanded }) = self.body.as_mut() {
                    if index < projects.len() {
                        *expanded = if *expanded == Some(index) {
                            None
                        } else {
                            Some(index)
                        };
                    }
                }
                Vec::new()
            }
        }
    }

    fn activate(&mut self, trigger: TriggerId, slug: &str) -> Vec<OverlayEffect> {
        let Some(drawer) = DrawerId::from_slug(slug) else {
            debug!(slug, "ignoring activation for unknown drawer");
            return Vec::new();
        };

        // An activation arriving while an exit cleanup is in flight cancels
        // the pending cleanup; it never queues behind it.
        self.pending_cleanup = None;

        if self.state == OverlayState::Open(drawer) {
            return Vec::new();
        }

        self.state = OverlayState::Open(drawer);
        self.body = Some(self.fresh_body(drawer));
        self.drag_offset = 0.0;
        self.opened_by = Some(trigger);
        debug!(drawer = drawer.slug(), "drawer opened");
        vec![OverlayEffect::FocusDrawer(drawer)]
    }

    fn close(&mut self, reason: DismissReason) -> Vec<OverlayEffect> {
        let OverlayState::Open(drawer) = self.state else {
            return Vec::new();
        };

        self.state = OverlayState::Closed;
        self.body = None;
        self.drag_offset = 0.0;

        let ticket = self.issue_ticket();
        self.pending_cleanup = Some(ticket);
        let mut effects = vec![OverlayEffect::ScheduleCleanup(ticket)];
        if let Some(trigger) = self.opened_by.take() {
            effects.push(OverlayEffect::ReturnFocusTo(trigger));
        }
        debug!(drawer = drawer.slug(), ?reason, "drawer dismissed");
        effects
    }

    fn release_drag(&mut self) -> Vec<OverlayEffect> {
        if self.open_drawer().is_none() {
            return Vec::new();
        }
        if self.drag_offset >= self.release_threshold {
            self.close(DismissReason::SwipeRelease)
        } else {
            self.drag_offset = 0.0;
            Vec::new()
        }
    }

    fn fresh_body(&self, drawer: DrawerId) -> DrawerBody {
        match drawer {
            DrawerId::Work => DrawerBody::Work {
                projects: self.projects.clone(),
                expanded: None,
            },
            DrawerId::Contact => DrawerBody::Contact(MessageDraft::default()),
        }
    }

    fn issue_ticket(&mut self) -> CleanupTicket {
        self.next_ticket += 1;
        CleanupTicket(self.next_ticket)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
