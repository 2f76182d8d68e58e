//! Text rendering of UI updates for the terminal front end.

use std::io::Write;

use crate::domain::{CodeBlockView, ParticipantRecord};
use crate::usecase::UiUpdate;

use super::completer::SharedRoster;
use super::formatter::MessageFormatter;

/// Redisplay the prompt after printing output
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Keeps what the terminal needs between updates
pub struct TerminalView {
    roster: SharedRoster,
    local_username: Option<String>,
    last_code: Option<CodeBlockView>,
}

impl TerminalView {
    pub fn new(roster: SharedRoster) -> Self {
        Self {
            roster,
            local_username: None,
            last_code: None,
        }
    }

    /// Text for `update`, or `None` if nothing should be printed
    pub fn render(&mut self, update: &UiUpdate) -> Option<String> {
        match update {
            UiUpdate::Identity { username } => {
                self.local_username = Some(username.clone());
                Some(MessageFormatter::format_identity(username))
            }
            UiUpdate::Phase(phase) => Some(MessageFormatter::format_phase(*phase)),
            UiUpdate::Role(role) => MessageFormatter::format_role(*role),
            UiUpdate::Participants(participants) => {
                self.share_roster(participants);
                Some(MessageFormatter::format_participants(
                    participants,
                    self.local_username.as_deref(),
                ))
            }
            UiUpdate::PendingRequests { requests, visible } => {
                Some(MessageFormatter::format_pending(requests, *visible)).filter(|text| !text.is_empty())
            }
            UiUpdate::ChatMessageAppended(message) => {
                if let Some(code) = &message.code {
                    self.last_code = Some(code.clone());
                }
                Some(MessageFormatter::format_chat_message(message))
            }
            // rustyline owns the input line
            UiUpdate::ChatInput { .. } => None,
            UiUpdate::MentionSuggestions(suggestions) => suggestions
                .as_ref()
                .map(MessageFormatter::format_suggestions),
            UiUpdate::SessionError { message } => Some(MessageFormatter::format_error(message)),
        }
    }

    /// Toggle the most recent code block and print its state
    pub fn toggle_last_code(&mut self) -> String {
        match &mut self.last_code {
            Some(code) => {
                code.toggle();
                MessageFormatter::format_code_block(code)
            }
            None => "\n(no code block received yet)\n".to_string(),
        }
    }

    fn share_roster(&self, participants: &[ParticipantRecord]) {
        match self.roster.write() {
            Ok(mut roster) => *roster = participants.to_vec(),
            Err(_) => tracing::warn!("Completion roster is poisoned; mentions will not complete"),
        }
    }
}
