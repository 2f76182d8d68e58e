//! Message formatting utilities for the terminal view.

use crate::domain::{
    ChatMessageView, CodeBlockView, ConnectionPhase, ParticipantRecord, PendingRequest, Role,
    TextSpan,
};
use crate::usecase::MentionSuggestions;

use super::dom;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for the terminal view
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the identity banner
    pub fn format_identity(username: &str) -> String {
        format!("\n{}\n", dom::username_text(username))
    }

    pub fn format_phase(phase: ConnectionPhase) -> String {
        format!("\n[{}] {}\n", dom::status_class(phase), dom::status_text(phase))
    }

    pub fn format_role(role: Role) -> Option<String> {
        match role {
            Role::Host => Some("\nYou are hosting this session.\n".to_string()),
            Role::Guest => Some("\nYou joined as a guest.\n".to_string()),
            Role::Unknown => None,
        }
    }

    /// Format the participant list in join order
    ///
    /// # Arguments
    ///
    /// * `participants` - Remote participants, in join order
    /// * `local_username` - The local user, listed first and marked "(me)"
    pub fn format_participants(participants: &[ParticipantRecord], local_username: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str("Participants:\n");

        if let Some(username) = local_username {
            output.push_str(&format!("{} (me)\n", username));
        }
        if participants.is_empty() {
            output.push_str("(No other participants)\n");
        } else {
            for participant in participants {
                output.push_str(&format!(
                    "{} [{}]\n",
                    participant.username, participant.color
                ));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the pending join requests; empty when the section is hidden
    pub fn format_pending(requests: &[PendingRequest], visible: bool) -> String {
        if !visible {
            return String::new();
        }
        let mut output = String::from("\nPending requests:\n");
        for request in requests {
            output.push_str(&format!(
                "  #{} {}  (/approve {id} | /reject {id})\n",
                dom::pending_element_id(&request.session_id),
                request.prompt(),
                id = request.session_id
            ));
        }
        output
    }

    /// Format a received chat message with its collapsed code block
    pub fn format_chat_message(message: &ChatMessageView) -> String {
        let body: String = message
            .body
            .iter()
            .map(|span| match span {
                TextSpan::Plain(text) => text.clone(),
                TextSpan::Mention(mention) => format!("[{}]", mention),
            })
            .collect();

        let mut output = format!(
            "\n\n{}\n[{}] {}: {}\n",
            THIN_RULE, message.time_label, message.username, body
        );
        if let Some(code) = &message.code {
            output.push_str(&format!(
                "> {} {}:{}-{} (/expand)\n",
                code.label, code.file, code.start_line, code.end_line
            ));
        }
        output.push_str(&format!("{}\n", THIN_RULE));
        output
    }

    /// Format an expanded code block, content verbatim
    pub fn format_code_block(code: &CodeBlockView) -> String {
        match code.visible_content() {
            Some(content) => format!(
                "\n{} {}:{}-{}\n{}\n{}\n",
                code.label, code.file, code.start_line, code.end_line, content, THIN_RULE
            ),
            None => format!("\n> {}\n", code.label),
        }
    }

    pub fn format_suggestions(suggestions: &MentionSuggestions) -> String {
        let names: Vec<String> = suggestions
            .usernames
            .iter()
            .enumerate()
            .map(|(index, name)| {
                if index == suggestions.selected_index {
                    format!("*{}", name)
                } else {
                    name.clone()
                }
            })
            .collect();
        if names.is_empty() {
            format!("\n(no match for @{})\n", suggestions.filter_text)
        } else {
            format!("\n{}\n", names.join("  "))
        }
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }
}
