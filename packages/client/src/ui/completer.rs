//! Tab completion of `@mentions` at the terminal prompt.

use std::sync::{Arc, RwLock};

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::domain::{ParticipantRecord, filter_candidates, find_trigger_context};

/// Participants visible to the readline thread
pub type SharedRoster = Arc<RwLock<Vec<ParticipantRecord>>>;

/// Completion for the mention under the cursor.
///
/// `cursor` is a byte offset, as rustyline reports it. Returns the byte offset
/// where the replacement starts and the replacements in roster order.
pub fn complete_mention(
    line: &str,
    cursor: usize,
    participants: &[ParticipantRecord],
    trigger: char,
) -> Option<(usize, Vec<String>)> {
    let head = line.get(..cursor)?;
    let context = find_trigger_context(line, head.chars().count(), trigger)?;
    let start = line
        .char_indices()
        .nth(context.start)
        .map(|(offset, _)| offset)?;

    let replacements = filter_candidates(participants, &context.filter_text)
        .into_iter()
        .map(|record| format!("{}{} ", trigger, record.username))
        .collect();
    Some((start, replacements))
}

/// rustyline helper completing mentions from the live roster
pub struct MentionCompleter {
    roster: SharedRoster,
    trigger: char,
}

impl MentionCompleter {
    pub fn new(roster: SharedRoster, trigger: char) -> Self {
        Self { roster, trigger }
    }
}

impl Completer for MentionCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let participants = match self.roster.read() {
            Ok(roster) => roster.clone(),
            Err(_) => return Ok((pos, Vec::new())),
        };
        let Some((start, replacements)) = complete_mention(line, pos, &participants, self.trigger)
        else {
            return Ok((pos, Vec::new()));
        };

        let pairs = replacements
            .into_iter()
            .map(|replacement| Pair {
                display: replacement.trim_end().to_string(),
                replacement,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for MentionCompleter {
    type Hint = String;
}

impl Highlighter for MentionCompleter {}

impl Validator for MentionCompleter {}

impl Helper for MentionCompleter {}
