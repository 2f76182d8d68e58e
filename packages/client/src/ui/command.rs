//! Parsing of lines typed into the terminal prompt.

use thiserror::Error;

/// What a typed line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `/host`
    Host,
    /// `/join <address>`
    Join(String),
    /// `/approve <sessionId>`
    Approve(String),
    /// `/reject <sessionId>`
    Reject(String),
    /// `/attach <file> <start> <end>`
    Attach { file: String, start: u32, end: u32 },
    /// `/expand`
    Expand,
    /// `/who`
    Who,
    /// `/quit`
    Quit,
    /// Anything else is sent as a chat message
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a line number")]
    InvalidLineNumber(String),

    #[error("unknown command '/{0}' (try /host, /join, /approve, /reject, /attach, /expand, /who, /quit)")]
    Unknown(String),
}

pub fn parse_line(line: &str) -> Result<InputCommand, CommandParseError> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(InputCommand::Chat(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("host", []) => Ok(InputCommand::Host),
        ("host", _) => Err(CommandParseError::Usage("/host")),
        ("join", [address]) => Ok(InputCommand::Join(address.to_string())),
        ("join", _) => Err(CommandParseError::Usage("/join <address>")),
        ("approve", [session_id]) => Ok(InputCommand::Approve(session_id.to_string())),
        ("approve", _) => Err(CommandParseError::Usage("/approve <sessionId>")),
        ("reject", [session_id]) => Ok(InputCommand::Reject(session_id.to_string())),
        ("reject", _) => Err(CommandParseError::Usage("/reject <sessionId>")),
        ("attach", [file, start, end]) => Ok(InputCommand::Attach {
            file: file.to_string(),
            start: parse_line_number(start)?,
            end: parse_line_number(end)?,
        }),
        ("attach", _) => Err(CommandParseError::Usage("/attach <file> <start> <end>")),
        ("expand", _) => Ok(InputCommand::Expand),
        ("who", _) => Ok(InputCommand::Who),
        ("quit", _) | ("exit", _) => Ok(InputCommand::Quit),
        (other, _) => Err(CommandParseError::Unknown(other.to_string())),
    }
}

fn parse_line_number(value: &str) -> Result<u32, CommandParseError> {
    value
        .parse()
        .map_err(|_| CommandParseError::InvalidLineNumber(value.to_string()))
}
