//! Controller init table format
//!
//! A table is a byte string of records:
//!
//! ```text
//! command, length | DELAY_FLAG, data[length], [delay_ms]
//! ```
//!
//! The delay byte is present only when `DELAY_FLAG` is set; 255 stands for
//! 500 ms. The table ends with the sentinel `0xFF 0xFF`. A command of
//! `0xFF` with any other length byte is an ordinary record.

use prism_core::ProtocolError;

/// Length byte flag announcing a trailing delay byte
pub const DELAY_FLAG: u8 = 0x80;

/// Delay byte value meaning [`LONG_DELAY_MS`]
pub const LONG_DELAY: u8 = 255;

pub const LONG_DELAY_MS: u32 = 500;

/// Terminating record
pub const SENTINEL: [u8; 2] = [0xFF, 0xFF];

/// One decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitCommand<'a> {
    pub command: u8,
    pub params: &'a [u8],
    /// Wait after the command, 0 for none
    pub delay_ms: u32,
}

/// Borrowed init table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitTable<'a>(&'a [u8]);

impl<'a> InitTable<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Records in table order
    ///
    /// Yields an error and stops on a truncated record or a missing
    /// sentinel.
    pub fn commands(&self) -> Commands<'a> {
        Commands {
            rest: self.0,
            done: false,
        }
    }

    /// Walk the whole table once
    pub fn validate(&self) -> Result<usize, ProtocolError> {
        let mut count = 0;
        for cmd in self.commands() {
            cmd?;
            count += 1;
        }
        Ok(count)
    }
}

/// Iterator over [`InitCommand`]s
pub struct Commands<'a> {
    rest: &'a [u8],
    done: bool,
}

impl<'a> Commands<'a> {
    fn fail(&mut self) -> Option<Result<InitCommand<'a>, ProtocolError>> {
        self.done = true;
        Some(Err(ProtocolError::MalformedInitTable))
    }
}

impl<'a> Iterator for Commands<'a> {
    type Item = Result<InitCommand<'a>, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (command, len_byte) = match self.rest {
            [c, l, ..] => (*c, *l),
            _ => return self.fail(),
        };
        if [command, len_byte] == SENTINEL {
            self.done = true;
            return None;
        }

        let len = (len_byte & !DELAY_FLAG) as usize;
        let has_delay = len_byte & DELAY_FLAG != 0;
        let end = 2 + len + has_delay as usize;
        if self.rest.len() < end {
            return self.fail();
        }
        let params = &self.rest[2..2 + len];
        let delay_ms = match (has_delay, self.rest[end - 1]) {
            (false, _) => 0,
            (true, LONG_DELAY) => LONG_DELAY_MS,
            (true, ms) => ms as u32,
        };
        self.rest = &self.rest[end..];
        Some(Ok(InitCommand {
            command,
            params,
            delay_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn collect(bytes: &[u8]) -> Vec<Result<InitCommand<'_>, ProtocolError>> {
        InitTable::new(bytes).commands().collect()
    }

    #[test]
    fn test_records_and_delays() {
        let table = [
            0x01, DELAY_FLAG, 150, // software reset
            0x3A, 1, 0x55, //
            0x11, DELAY_FLAG, LONG_DELAY, //
            0xB6, 2 | DELAY_FLAG, 0x0A, 0x82, 5, //
            0xFF, 0xFF,
        ];
        let cmds: Vec<_> = collect(&table).into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], InitCommand { command: 0x01, params: &[], delay_ms: 150 });
        assert_eq!(cmds[1], InitCommand { command: 0x3A, params: &[0x55], delay_ms: 0 });
        assert_eq!(cmds[2].delay_ms, LONG_DELAY_MS);
        assert_eq!(cmds[3].params, &[0x0A, 0x82]);
        assert_eq!(cmds[3].delay_ms, 5);
    }

    #[test]
    fn test_ff_command_is_not_sentinel() {
        let table = [0xFF, 3, 0x60, 0x01, 0x04, 0xFF, 0xFF];
        assert_eq!(InitTable::new(&table).validate(), Ok(1));
        let first = collect(&table)[0].unwrap();
        assert_eq!(first.command, 0xFF);
        assert_eq!(first.params, &[0x60, 0x01, 0x04]);
    }

    #[test]
    fn test_truncated_record() {
        let table = [0x2A, 4, 0x00, 0x00];
        let cmds = collect(&table);
        assert_eq!(cmds, [Err(ProtocolError::MalformedInitTable)]);
    }

    #[test]
    fn test_missing_delay_byte() {
        let table = [0x11, DELAY_FLAG];
        assert_eq!(
            InitTable::new(&table).validate(),
            Err(ProtocolError::MalformedInitTable)
        );
    }

    #[test]
    fn test_missing_sentinel() {
        let table = [0x29, 0];
        let cmds = collect(&table);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].is_ok());
        assert_eq!(cmds[1], Err(ProtocolError::MalformedInitTable));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(InitTable::new(&SENTINEL).validate(), Ok(0));
        assert!(InitTable::new(&[]).validate().is_err());
    }
}
