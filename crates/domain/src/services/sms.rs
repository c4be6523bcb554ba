//! Inbound SMS command parsing and reply texts.

/// Fixed replies sent back over SMS.
pub mod replies {
    pub const UNKNOWN_NUMBER: &str = "ERROR: Unknown number";
    pub const YES: &str = "See you at the game";
    pub const NO: &str = "Sorry you can't make it";
    pub const STOP: &str = "Stopping future reminders";
    pub const UNKNOWN_REPLY: &str = "Unknown reply, valid replies are YES, NO or STOP";
    pub const NO_PENDING_GAME: &str = "No upcoming game to reply to";
    pub const AMBIGUOUS_TEAM: &str =
        "You have games on several teams, please reply using the link in your reminder email";
    pub const INTERNAL_ERROR: &str = "Internal Error";
}

/// Reduces a message body to its command code.
///
/// Non-letters are dropped and the first remaining letter is uppercased, so
/// `"yes!"`, `"Y"` and `"YES."` all give `Y`. Returns `None` when no letter
/// remains.
pub fn command_code(body: &str) -> Option<char> {
    body.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
}

/// A recognized reply command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsCommand {
    Yes,
    No,
    Stop,
    /// Includes `M`: maybe is not an accepted SMS reply.
    Unrecognized,
}

impl SmsCommand {
    pub fn parse(body: &str) -> Self {
        match command_code(body) {
            Some('Y') => SmsCommand::Yes,
            Some('N') => SmsCommand::No,
            Some('S') => SmsCommand::Stop,
            _ => SmsCommand::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_variants() {
        for body in ["Yes", "YES!!", "y", "Yes, I can make it", "  ...yes."] {
            assert_eq!(command_code(body), Some('Y'), "body: {body:?}");
            assert_eq!(SmsCommand::parse(body), SmsCommand::Yes);
        }
    }

    #[test]
    fn test_stop_variants() {
        assert_eq!(command_code("STOP"), Some('S'));
        assert_eq!(command_code("Stop please"), Some('S'));
        assert_eq!(SmsCommand::parse("stop"), SmsCommand::Stop);
    }

    #[test]
    fn test_no() {
        assert_eq!(SmsCommand::parse("no way"), SmsCommand::No);
        assert_eq!(SmsCommand::parse("N"), SmsCommand::No);
    }

    #[test]
    fn test_maybe_is_parsed_but_unrecognized() {
        assert_eq!(command_code("maybe next time"), Some('M'));
        assert_eq!(SmsCommand::parse("maybe next time"), SmsCommand::Unrecognized);
    }

    #[test]
    fn test_empty_and_punctuation() {
        assert_eq!(command_code(""), None);
        assert_eq!(command_code("?!... 123"), None);
        assert_eq!(SmsCommand::parse("!!!"), SmsCommand::Unrecognized);
    }
}
