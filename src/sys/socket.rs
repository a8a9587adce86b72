use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::Result;
use super::Transport;

const TERMINATOR: &str = "\r\n";

/// Line-oriented transport over a raw TCP socket, as exposed by LAN/GPIB gateways.
#[derive(Debug)]
pub struct SocketTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl SocketTransport {
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Option<Duration>) -> Result<SocketTransport> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        stream.set_nodelay(true)?;
        log::debug!("connected to {:?}", stream.peer_addr()?);
        Ok(SocketTransport {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }
}

impl Transport for SocketTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        log::trace!("socket write {:?}", command);
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(TERMINATOR.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn ask(&mut self, command: &str) -> Result<String> {
        self.write(command)?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into())
        }
        // the carriage return, if any, is part of the response grammar
        if line.ends_with('\n') {
            line.pop();
        }
        log::trace!("socket read {:?}", line);
        Ok(line)
    }
}
