//! Raw key decoding.
//!
//! In raw mode the terminal hands us bytes, not keys. An arrow press arrives
//! as the three bytes `1b 5b 41`, a bare Esc as the single byte `1b`.
//! [`KeyDecoder`] reads whatever one `read` returns and splits it into
//! complete [`Key`] tokens:
//!
//! - `1b 5b ...` is a CSI sequence, complete at its final byte (`0x40..=0x7e`)
//! - `1b` followed by anything other than `[` is Esc; the next byte starts
//!   a token of its own
//! - a UTF-8 lead byte pulls in its continuation bytes
//!
//! There is no timeout. A CSI prefix that never completes blocks until more
//! input arrives.

use std::collections::VecDeque;
use std::io::{self, Read};

use log::debug;

use crate::core::action::Key;

const READ_BUFFER_SIZE: usize = 64;

pub struct KeyDecoder<R> {
    reader: R,
    pending: VecDeque<u8>,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Block until one complete key is available.
    ///
    /// Interrupted reads are retried. Any other failed read, or end of input,
    /// is returned as an error.
    pub fn next_key(&mut self) -> io::Result<Key> {
        let first = self.next_byte()?;
        let mut bytes = vec![first];

        match first {
            0x1b => {
                if self.pending.front() == Some(&0x5b) {
                    bytes.push(self.next_byte()?);
                    loop {
                        let b = self.next_byte()?;
                        bytes.push(b);
                        if (0x40..=0x7e).contains(&b) {
                            break;
                        }
                    }
                }
            }
            lead => {
                for _ in 1..utf8_len(lead) {
                    bytes.push(self.next_byte()?);
                }
            }
        }

        Ok(Key::from_bytes(&bytes))
    }

    /// Decode keys until the handler returns `false` or an exit token is seen.
    ///
    /// Exit tokens are still passed to the handler before the loop ends.
    pub fn read_keys<F>(&mut self, mut on_key_press: F) -> io::Result<()>
    where
        F: FnMut(Key) -> io::Result<bool>,
    {
        loop {
            let key = self.next_key()?;
            debug!("Key pressed: {}", key.hex());
            let exit = key.is_exit();
            if !on_key_press(key)? || exit {
                return Ok(());
            }
        }
    }

    fn next_byte(&mut self) -> io::Result<u8> {
        loop {
            if let Some(b) = self.pending.pop_front() {
                return Ok(b);
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let n = match self.reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(e),
        };
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        self.pending.extend(&buf[..n]);
        Ok(())
    }
}

/// Number of bytes in the UTF-8 sequence introduced by `lead`.
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}
