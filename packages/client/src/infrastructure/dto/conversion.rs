//! Conversion logic between envelope payloads and domain types.

use duet_shared::envelope::{ChatPayload, CodeReferencePayload, Command};

use crate::domain::{ChatError, ChatMessage, CodeReference, JoinDecision, Username};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<CodeReferencePayload> for CodeReference {
    type Error = ChatError;

    fn try_from(dto: CodeReferencePayload) -> Result<Self, Self::Error> {
        CodeReference::new(dto.file, dto.start_line, dto.end_line, dto.content)
    }
}

impl TryFrom<ChatPayload> for ChatMessage {
    type Error = ChatError;

    fn try_from(dto: ChatPayload) -> Result<Self, Self::Error> {
        let username = Username::new(dto.username)?;
        let reference = dto.reference.map(CodeReference::try_from).transpose()?;
        Ok(ChatMessage::new(
            username,
            dto.text,
            dto.color,
            dto.timestamp,
            reference,
        ))
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&CodeReference> for CodeReferencePayload {
    fn from(model: &CodeReference) -> Self {
        Self {
            file: model.file().to_string(),
            start_line: model.start_line(),
            end_line: model.end_line(),
            content: model.content().to_string(),
        }
    }
}

impl From<JoinDecision> for Command {
    fn from(decision: JoinDecision) -> Self {
        let session_id = decision.session_id.into_string();
        if decision.approved {
            Command::ApproveRequest { session_id }
        } else {
            Command::RejectRequest { session_id }
        }
    }
}
