/*!
Serial port channel.

Wraps a `serialport` handle in the protocol's [`Channel`] trait. The port is
dropped on close, after which the channel reports itself closed.
*/

use anyhow::{Context, Result};
use dwin_protocol::Channel;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::info;

use crate::config::SerialConfig;

/// Display channel over a UART
pub struct SerialChannel {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialChannel {
    /// Open the configured port as 8N1 without flow control
    pub fn open(config: &SerialConfig, timeout: Duration) -> Result<Self> {
        info!("🔌 Opening serial port {} at {} baud", config.port, config.baud_rate);

        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .with_context(|| format!("Failed to open serial port {}", config.port))?;

        Ok(Self {
            port: Some(port),
            name: config.port.clone(),
        })
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))
    }
}

impl Channel for SerialChannel {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.port()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.port()?.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.port()?.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port()?.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> io::Result<()> {
        // serialport has a single timeout covering both directions.
        self.port()?.set_timeout(read.max(write))?;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.port.take().is_some() {
            info!("Serial port {} closed", self.name);
        }
        Ok(())
    }
}
