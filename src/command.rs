//! In-band command parsing and execution
//!
//! A client line starting with `/` is parsed into a `Command` and executed
//! against the connection table. Parsing is a pure function over the line;
//! execution performs the direct, unbuffered sends.

use tracing::{debug, warn};

use crate::registry::ConnectionTable;
use crate::types::ConnId;

/// Parsed client command
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/nick <name>` with a non-empty name
    Nick(&'a str),
    /// `/list`; any argument is ignored
    List,
    /// `/dm <target> <message>` with both parts present
    Dm {
        /// Nickname to deliver to (first exact match wins)
        target: &'a str,
        /// Raw remainder after the target; may itself contain spaces
        message: &'a str,
    },
    /// `/dm` missing its target or message; dropped without client feedback
    DmMalformed,
    /// Anything else, including `/nick` without an argument
    Unsupported,
}

/// Parse one line already known to start with `/`.
///
/// The line is first cut at the first carriage return and the first line
/// feed, then split at the first space into verb and argument. Verbs match
/// exactly and case-sensitively; an empty argument counts as absent.
pub fn parse(line: &str) -> Command<'_> {
    let line = strip_terminators(line);
    let (verb, arg) = match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg),
        None => (line, ""),
    };

    match verb {
        "/nick" if !arg.is_empty() => Command::Nick(arg),
        "/list" => Command::List,
        "/dm" => match arg.split_once(' ') {
            Some((target, message)) if !target.is_empty() && !message.is_empty() => {
                Command::Dm { target, message }
            }
            _ => Command::DmMalformed,
        },
        _ => Command::Unsupported,
    }
}

/// Cut the line at the first `\r` and the first `\n`, whichever come first
fn strip_terminators(line: &str) -> &str {
    let line = match line.find('\r') {
        Some(pos) => &line[..pos],
        None => line,
    };
    match line.find('\n') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Execute one command line on behalf of `sender`.
///
/// Every outbound send here is a direct best-effort write to a single
/// connection; there is no delivery confirmation.
pub fn handle(table: &mut ConnectionTable, sender: ConnId, line: &str) {
    match parse(line) {
        Command::Nick(nick) => {
            if let Some(conn) = table.get_mut(sender) {
                debug!("client {} renamed '{}' -> '{}'", sender, conn.nickname(), nick);
                conn.set_nickname(nick.to_string());
            }
        }
        Command::List => {
            let Some(requester) = table.get(sender) else {
                return;
            };
            let mut listing = String::new();
            for conn in table.iter() {
                listing.push_str(conn.nickname());
                listing.push('\n');
            }
            requester.send(&listing);
            requester.send(&format!("Number of connected users: {}\n", table.len()));
        }
        Command::Dm { target, message } => {
            let Some(requester) = table.get(sender) else {
                return;
            };
            match table.lookup_by_nickname(target) {
                Some(peer) => {
                    peer.send(&format!("DM from {}: {}", requester.nickname(), message));
                }
                None => requester.send("User not found\n"),
            }
        }
        Command::DmMalformed => {
            // Intentionally no client feedback, unlike unsupported commands.
            warn!("client {} sent malformed /dm, format is /dm <nickname> <message>", sender);
        }
        Command::Unsupported => {
            if let Some(conn) = table.get(sender) {
                conn.send("Unsupported command\n");
            }
        }
    }
}
