//! Modbus RTU framing over a serial port: `unit_id | pdu | crc16_le`
//!
//! CRC framing mirrors the check-then-strip approach `rmodbus` uses server
//! side; the serial I/O itself goes through `tokio-serial`, already an
//! optional dependency this crate carries behind the `rtu` feature.

use crc::{Crc, CRC_16_MODBUS};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialStream;

use crate::error::{ModbusError, ModbusResult};

use super::{ReceivedFrame, RequestTransport};

const CRC16_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// One open serial port, framed with unit id + PDU + CRC16.
pub struct RtuRequestTransport {
    port: SerialStream,
    buf: Vec<u8>,
}

impl RtuRequestTransport {
    pub fn new(port: SerialStream) -> Self {
        Self {
            port,
            buf: vec![0u8; 256],
        }
    }
}

impl RequestTransport for RtuRequestTransport {
    async fn recv(&mut self) -> ModbusResult<Option<ReceivedFrame>> {
        let n = self
            .port
            .read(&mut self.buf)
            .await
            .map_err(|err| ModbusError::Io {
                message: err.to_string(),
            })?;

        if n == 0 {
            return Ok(None);
        }
        if n < 4 {
            return Err(ModbusError::Protocol {
                message: format!("RTU frame too short: {n} bytes"),
            });
        }

        let frame = &self.buf[..n];
        let (body, crc_bytes) = frame.split_at(n - 2);
        let expected = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
        let actual = CRC16_MODBUS.checksum(body);
        if actual != expected {
            return Err(ModbusError::Protocol {
                message: format!("RTU CRC mismatch: expected 0x{expected:04X}, got 0x{actual:04X}"),
            });
        }

        let unit = body[0];
        let pdu = body[1..].to_vec();
        Ok(Some(ReceivedFrame { unit, pdu }))
    }

    async fn send(&mut self, unit: u8, pdu: &[u8]) -> ModbusResult<()> {
        let mut frame = Vec::with_capacity(pdu.len() + 3);
        frame.push(unit);
        frame.extend_from_slice(pdu);
        let crc = CRC16_MODBUS.checksum(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());

        self.port
            .write_all(&frame)
            .await
            .map_err(|err| ModbusError::Io {
                message: err.to_string(),
            })
    }
}
