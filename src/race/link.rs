/// Peer links: where race messages go and where they come from.
///
/// `StdioLink` talks to a real opponent over a byte stream pair (stdin and
/// stdout in race mode). A detached reader thread decodes one byte at a
/// time and posts valid messages into the mailbox; the host loop takes at
/// most one per frame.
///
/// `Loopback` hands every sent message straight back, so a single instance
/// runs the same protocol against itself.

use std::io::{self, ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::mailbox::Mailbox;
use super::message::RaceMessage;

pub trait PeerLink {
    /// Write one message to the peer.
    fn send(&mut self, msg: RaceMessage) -> io::Result<()>;

    /// Take the latest unread message, if any.
    fn poll(&mut self) -> Option<RaceMessage>;
}

fn decode_slot(inbox: &Mailbox) -> Option<RaceMessage> {
    inbox.take().and_then(|byte| RaceMessage::try_from(byte).ok())
}

// ══════════════════════════════════════════════════════════════
// Stdio
// ══════════════════════════════════════════════════════════════

pub struct StdioLink<W: Write> {
    inbox: Mailbox,
    writer: W,
}

impl<W: Write> StdioLink<W> {
    /// Spawn the reader thread over `reader` and write to `writer`.
    /// The thread is never joined; process exit ends it.
    pub fn spawn<R>(reader: R, writer: W, poll_interval: Duration) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let inbox = Mailbox::new();
        let posted = inbox.clone();
        thread::Builder::new()
            .name("race-reader".into())
            .spawn(move || read_loop(reader, posted, poll_interval))?;
        Ok(StdioLink { inbox, writer })
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> PeerLink for StdioLink<W> {
    fn send(&mut self, msg: RaceMessage) -> io::Result<()> {
        debug!(%msg, "race message sent");
        self.writer.write_all(&[msg.to_byte()])?;
        self.writer.flush()
    }

    fn poll(&mut self) -> Option<RaceMessage> {
        decode_slot(&self.inbox)
    }
}

fn read_loop<R: Read>(mut reader: R, inbox: Mailbox, poll_interval: Duration) {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => {
                warn!("peer stream closed");
                return;
            }
            Ok(_) => match RaceMessage::try_from(byte[0]) {
                Ok(msg) => inbox.post(msg.to_byte()),
                Err(err) => trace!(%err, "byte dropped"),
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "peer read failed");
                return;
            }
        }
        thread::sleep(poll_interval);
    }
}

// ══════════════════════════════════════════════════════════════
// Loopback
// ══════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct Loopback {
    inbox: Mailbox,
}

impl Loopback {
    pub fn new() -> Self {
        Loopback::default()
    }
}

impl PeerLink for Loopback {
    fn send(&mut self, msg: RaceMessage) -> io::Result<()> {
        trace!(%msg, "loopback");
        self.inbox.post(msg.to_byte());
        Ok(())
    }

    fn poll(&mut self) -> Option<RaceMessage> {
        decode_slot(&self.inbox)
    }
}
