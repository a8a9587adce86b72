use std::cell::RefCell;
use std::rc::Rc;

use crate::Result;

/// Request/response access to an instrument over some ASCII command channel.
///
/// Implementations own terminators and timeouts. Responses are returned as received, without
/// the line feed but including any status prefix or trailing carriage return the instrument sends.
pub trait Transport {
    fn write(&mut self, command: &str) -> Result<()>;
    fn ask(&mut self, command: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn ask(&mut self, command: &str) -> Result<String> {
        (**self).ask(command)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn ask(&mut self, command: &str) -> Result<String> {
        (**self).ask(command)
    }
}

// Channels of one mainframe share its connection; access is serialized by the single owner thread.
impl<T: Transport + ?Sized> Transport for Rc<RefCell<T>> {
    fn write(&mut self, command: &str) -> Result<()> {
        self.borrow_mut().write(command)
    }

    fn ask(&mut self, command: &str) -> Result<String> {
        self.borrow_mut().ask(command)
    }
}

mod loopback;
pub use loopback::LoopbackTransport;

#[cfg(feature = "socket")]
mod socket;
#[cfg(feature = "socket")]
pub use socket::SocketTransport;
