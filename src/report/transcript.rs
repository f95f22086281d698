//! Transcript rendering: conversations grouped by token, in sheet order.

use serde::Serialize;

use crate::common::Result;
use crate::common::xml::escape_xml;
use crate::sheet::{CellValue, SheetTable};

use super::token::{is_missing, normalize_token};
use super::{BOT_MESSAGES_COLUMN, GUEST_MESSAGES_COLUMN, TOKEN_COLUMN};

/// Request-scoped rendering configuration.
///
/// Passed into every render call instead of living in process-wide state, so
/// concurrent requests with different presentation needs cannot interfere.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Marker substituted for embedded newlines
    pub line_break: String,
    /// Escape message text for HTML/XML embedding before inserting markers
    pub escape_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            line_break: "<br>".to_string(),
            escape_text: false,
        }
    }
}

/// One rendered (guest, bot) message exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePair {
    pub guest: String,
    pub bot: String,
}

/// One conversation: a token label and its exchanges in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptGroup {
    pub token: String,
    pub rows: Vec<MessagePair>,
}

/// All of one sheet's conversations, in first-appearance order.
///
/// A token that reappears after another token intervenes starts a second
/// group with the same label; groups are an ordered list, not a unique map,
/// so a resumed conversation reads as a later block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TranscriptDocument {
    pub groups: Vec<TranscriptGroup>,
}

impl TranscriptDocument {
    /// Get the number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check whether the document has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Render one sheet's transcript.
///
/// Tokens are forward-filled in table order: a row with an empty token
/// belongs to the most recent conversation above it. Rows before the first
/// token belong to no conversation and are dropped.
pub fn render(table: &SheetTable, options: &RenderOptions) -> Result<TranscriptDocument> {
    let token_col = table.require_column(TOKEN_COLUMN)?;
    let guest_col = table.require_column(GUEST_MESSAGES_COLUMN)?;
    let bot_col = table.require_column(BOT_MESSAGES_COLUMN)?;

    let mut groups: Vec<TranscriptGroup> = Vec::new();
    let mut current: Option<String> = None;

    for row in table.rows() {
        let raw = &row[token_col];
        if !is_missing(raw) {
            let token = normalize_token(raw)?;
            if current.as_deref() != Some(token.as_str()) {
                groups.push(TranscriptGroup {
                    token: token.clone(),
                    rows: Vec::new(),
                });
            }
            current = Some(token);
        }
        if current.is_none() {
            continue;
        }
        if let Some(group) = groups.last_mut() {
            group.rows.push(MessagePair {
                guest: render_message(&row[guest_col], options),
                bot: render_message(&row[bot_col], options),
            });
        }
    }

    Ok(TranscriptDocument { groups })
}

/// Render one message cell: empty becomes the empty string, never a
/// missing-value marker; newlines become the configured line-break marker.
fn render_message(value: &CellValue, options: &RenderOptions) -> String {
    let text = value.to_display_string();
    let text = if options.escape_text {
        escape_xml(&text)
    } else {
        text
    };
    text.replace("\r\n", "\n").replace('\n', &options.line_break)
}
