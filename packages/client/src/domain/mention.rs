//! `@mention` autocomplete for the chat input.
//!
//! Positions are counted in `char`s, not bytes, so that names outside ASCII
//! do not split a code point.

use super::roster::ParticipantRecord;

/// Character that opens a mention
pub const DEFAULT_TRIGGER: char = '@';

/// Location of an in-progress mention inside the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    /// Index of the trigger character
    pub start: usize,
    /// Cursor index; the mention span is `start..end`
    pub end: usize,
    /// Text typed after the trigger
    pub filter_text: String,
}

/// Find the mention the cursor is currently inside of.
///
/// The trigger only counts at the start of the input or right after
/// whitespace, and the cursor must not be separated from it by whitespace.
pub fn find_trigger_context(text: &str, cursor: usize, trigger: char) -> Option<TriggerContext> {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    for index in (0..cursor).rev() {
        let c = chars[index];
        if c.is_whitespace() {
            return None;
        }
        if c == trigger {
            if index == 0 || chars[index - 1].is_whitespace() {
                return Some(TriggerContext {
                    start: index,
                    end: cursor,
                    filter_text: chars[index + 1..cursor].iter().collect(),
                });
            }
            // "user@example" is not a mention
            return None;
        }
    }
    None
}

/// Participants whose username starts with `filter_text`, ignoring case, in roster order.
pub fn filter_candidates(participants: &[ParticipantRecord], filter_text: &str) -> Vec<ParticipantRecord> {
    let needle = filter_text.to_lowercase();
    participants
        .iter()
        .filter(|record| record.username.as_str().to_lowercase().starts_with(&needle))
        .cloned()
        .collect()
}

/// Keys the suggestion list reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Input after a candidate was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCommit {
    pub text: String,
    pub cursor: usize,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMention {
    pub context: TriggerContext,
    pub selected_index: usize,
    pub candidates: Vec<ParticipantRecord>,
}

/// Suggestion widget state.
///
/// ```text
/// Closed ──trigger at word boundary──▶ Open ──commit / context lost──▶ Closed
///                                       Open ──escape──▶ Dismissed ──context lost / new trigger──▶ …
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MentionSession {
    #[default]
    Closed,
    Open(OpenMention),
    /// Escaped; stays shut while the cursor is in the run starting at `start`
    Dismissed { start: usize },
}

impl MentionSession {
    pub fn is_active(&self) -> bool {
        matches!(self, MentionSession::Open(_))
    }

    pub fn filter_text(&self) -> Option<&str> {
        match self {
            MentionSession::Open(open) => Some(&open.context.filter_text),
            MentionSession::Closed | MentionSession::Dismissed { .. } => None,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            MentionSession::Open(open) => Some(open.selected_index),
            MentionSession::Closed | MentionSession::Dismissed { .. } => None,
        }
    }

    pub fn candidates(&self) -> &[ParticipantRecord] {
        match self {
            MentionSession::Open(open) => &open.candidates,
            MentionSession::Closed | MentionSession::Dismissed { .. } => &[],
        }
    }

    /// Re-evaluate the session against the current input.
    ///
    /// Opens on a trigger at a word boundary and closes once the trigger
    /// context is gone. A dismissed trigger does not reopen. The selection
    /// survives only while the filter is unchanged.
    pub fn update(&mut self, text: &str, cursor: usize, participants: &[ParticipantRecord], trigger: char) {
        let Some(context) = find_trigger_context(text, cursor, trigger) else {
            *self = MentionSession::Closed;
            return;
        };
        if matches!(self, MentionSession::Dismissed { start } if *start == context.start) {
            return;
        }

        let candidates = filter_candidates(participants, &context.filter_text);
        let selected_index = match self {
            MentionSession::Open(open)
                if open.context.start == context.start
                    && open.context.filter_text == context.filter_text
                    && open.selected_index < candidates.len() =>
            {
                open.selected_index
            }
            _ => 0,
        };

        *self = MentionSession::Open(OpenMention {
            context,
            selected_index,
            candidates,
        });
    }

    /// Recompute candidates after the roster changed
    pub fn refresh_candidates(&mut self, participants: &[ParticipantRecord]) {
        if let MentionSession::Open(open) = self {
            open.candidates = filter_candidates(participants, &open.context.filter_text);
            if open.selected_index >= open.candidates.len() {
                open.selected_index = 0;
            }
        }
    }

    /// Move the selection with wraparound.
    ///
    /// Returns `false` when there is nothing to navigate, in which case the
    /// key belongs to the input.
    pub fn navigate(&mut self, key: MentionKey) -> bool {
        let MentionSession::Open(open) = self else {
            return false;
        };
        let count = open.candidates.len();
        if count == 0 {
            return false;
        }
        match key {
            MentionKey::ArrowDown => open.selected_index = (open.selected_index + 1) % count,
            MentionKey::ArrowUp => open.selected_index = (open.selected_index + count - 1) % count,
            MentionKey::Enter | MentionKey::Escape => return false,
        }
        true
    }

    /// Replace the trigger span with the selected candidate and close.
    ///
    /// `None` (session untouched) when closed or without candidates.
    pub fn commit(&mut self, text: &str, trigger: char) -> Option<MentionCommit> {
        let MentionSession::Open(open) = self else {
            return None;
        };
        let candidate = open.candidates.get(open.selected_index)?;
        let username = candidate.username.as_str().to_string();

        let chars: Vec<char> = text.chars().collect();
        let start = open.context.start.min(chars.len());
        let end = open.context.end.min(chars.len());

        let mut committed: String = chars[..start].iter().collect();
        committed.push(trigger);
        committed.push_str(&username);
        committed.push(' ');
        let cursor = committed.chars().count();
        committed.extend(chars[end..].iter());

        *self = MentionSession::Closed;
        Some(MentionCommit {
            text: committed,
            cursor,
            username,
        })
    }

    /// Close without committing. Typing on in the same mention keeps it closed.
    pub fn dismiss(&mut self) {
        if let MentionSession::Open(open) = self {
            let start = open.context.start;
            *self = MentionSession::Dismissed { start };
        }
    }

    /// Forget the session entirely, e.g. once the input was sent
    pub fn close(&mut self) {
        *self = MentionSession::Closed;
    }
}
