use std::path::PathBuf;

/// Navigation intents for driving the browser.
///
/// These events are emitted by the presentation layer and handled by
/// [`crate::Browser::apply_event`]. They carry no rendering types, which keeps
/// the state machine testable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowserEvent {
    /// Select a listing index; out-of-range indices are ignored.
    Select(usize),
    /// Move the selection by `delta` rows, wrapping at both ends.
    MoveSelection(isize),
    /// Activate the selected entry.
    Activate,
    /// Activate the parent-directory marker, if the listing has one.
    NavigateUp,
    /// Activate the rescan trigger.
    Rescan,
}

/// Outcome of one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    Ignored,
    /// Only the selection moved
    SelectionMoved,
    /// The current directory was rescanned and reloaded
    Rescanned,
    /// The current directory changed
    DirectoryChanged,
    /// A launchable entry was picked; the browser is done
    Launch(PathBuf),
}
