//! Input messages and emitted effects for the overlay controller.

use shared::domain::DrawerId;

/// Identifier of the page element that activated a drawer. Focus returns to
/// it when the drawer closes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerId(pub String);

impl TriggerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// How an open drawer was dismissed. Every variant yields the same
/// transition to closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseAction,
    BackdropPress,
    CancelKey,
    SwipeRelease,
}

/// Ticket identifying a scheduled exit cleanup. A ticket superseded by a
/// later activation is stale; its completion must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupTicket(pub(crate) u64);

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayInput {
    /// A trigger element was activated. The slug is resolved against the
    /// fixed drawer set; unknown slugs are dropped.
    Activate {
        trigger: TriggerId,
        drawer_slug: String,
    },
    Dismiss(DismissReason),
    /// Downward pointer movement while a drawer is open, in pixels.
    /// Negative values move the drawer back up.
    DragBy(f32),
    /// Pointer released after a drag; dismisses past the release threshold,
    /// snaps back otherwise.
    ReleaseDrag,
    /// The host finished the exit transition for the given ticket.
    CleanupFinished(CleanupTicket),
    /// The visitor edited the contact drawer's draft text.
    DraftEdited(String),
    /// The visitor toggled the expansion of a work-drawer project entry.
    ToggleProject(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEffect {
    /// Move keyboard focus into the newly opened drawer's content.
    FocusDrawer(DrawerId),
    /// Return keyboard focus to the trigger that opened the drawer.
    ReturnFocusTo(TriggerId),
    /// Play the exit transition, then report back with
    /// [`OverlayInput::CleanupFinished`].
    ScheduleCleanup(CleanupTicket),
}
