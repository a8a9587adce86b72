use std::collections::VecDeque;
use std::io;

use crate::{Error, Result};
use super::Transport;

/// In-memory transport that records commands and answers queries from a queue.
///
/// Used in place of an instrument when checking the exact command strings a controller emits.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    written: Vec<String>,
    asked: Vec<String>,
    responses: VecDeque<String>,
    fault: Option<io::ErrorKind>,
}

impl LoopbackTransport {
    pub fn new() -> LoopbackTransport {
        Default::default()
    }

    /// Queue `response` as the answer to the next unanswered `ask`.
    pub fn respond(&mut self, response: impl Into<String>) -> &mut Self {
        self.responses.push_back(response.into());
        self
    }

    /// Make every following operation fail with `kind` until `heal` is called.
    pub fn fail(&mut self, kind: io::ErrorKind) {
        self.fault = Some(kind);
    }

    pub fn heal(&mut self) {
        self.fault = None;
    }

    /// Commands sent with `write`, oldest first.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Commands sent with `ask`, oldest first.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Forget recorded commands and queued responses.
    pub fn clear(&mut self) {
        self.written.clear();
        self.asked.clear();
        self.responses.clear();
    }

    fn check_fault(&self) -> Result<()> {
        match self.fault {
            Some(kind) => Err(Error::Transport(io::Error::from(kind))),
            None => Ok(())
        }
    }
}

impl Transport for LoopbackTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        self.check_fault()?;
        self.written.push(command.to_owned());
        Ok(())
    }

    fn ask(&mut self, command: &str) -> Result<String> {
        self.check_fault()?;
        self.asked.push(command.to_owned());
        self.responses.pop_front().ok_or_else(|| Error::Transport(io::Error::new(
            io::ErrorKind::UnexpectedEof, format!("no response queued for {:?}", command))))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut transport = LoopbackTransport::new();
        transport.write("AV 1,0").unwrap();
        transport.write("FL 1").unwrap();
        assert_eq!(transport.written(), ["AV 1,0", "FL 1"]);
        assert!(transport.asked().is_empty());
    }

    #[test]
    fn test_answers_from_queue() {
        let mut transport = LoopbackTransport::new();
        transport.respond("first").respond("second");
        assert_eq!(transport.ask("A").unwrap(), "first");
        assert_eq!(transport.ask("B").unwrap(), "second");
        assert!(matches!(transport.ask("C"), Err(Error::Transport(_))));
        assert_eq!(transport.asked(), ["A", "B", "C"]);
    }

    #[test]
    fn test_clear() {
        let mut transport = LoopbackTransport::new();
        transport.write("FL 1").unwrap();
        transport.respond("first").respond("second");
        assert_eq!(transport.ask("A").unwrap(), "first");
        transport.clear();
        assert!(transport.written().is_empty());
        assert!(transport.asked().is_empty());
        assert!(transport.ask("B").is_err());
    }

    #[test]
    fn test_fault() {
        let mut transport = LoopbackTransport::new();
        transport.fail(io::ErrorKind::TimedOut);
        match transport.write("FL 0") {
            Err(Error::Transport(error)) => assert_eq!(error.kind(), io::ErrorKind::TimedOut),
            other => panic!("unexpected {:?}", other),
        }
        assert!(transport.written().is_empty());
        transport.heal();
        transport.write("FL 0").unwrap();
        assert_eq!(transport.written(), ["FL 0"]);
    }
}
