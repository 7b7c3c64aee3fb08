//! Fixed-capacity frame buffer with independent reader/writer cursors
//!
//! Generalizes the stack-allocated, single-cursor PDU buffer the client half
//! of this crate uses (`ModbusPdu`, `data: [u8; MAX_PDU_SIZE]`, "use a
//! fixed-size stack array to avoid heap allocation") into the two-cursor
//! buffer the server-side dispatcher needs: a request is read from position
//! 0 forward while a response is written from position 0 forward into the
//! same backing array, and the buffer is reused across requests on a
//! connection.

use crate::constants::MODBUS_RESPONSE_BUFFER_SIZE;
use crate::error::{ModbusError, ModbusResult};

/// A reusable byte buffer holding one PDU at a time, with independent
/// reader and writer cursors.
///
/// The reader is positioned over the incoming request; the writer is
/// positioned over the outgoing response. Both start at 0 and advance as
/// bytes are consumed or produced. `reset()` is called once per dispatch to
/// put both cursors back at the start for the next request.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Fixed-size buffer (stack), sized for the largest frame plus framing
    /// overhead the crate's transports produce.
    data: [u8; MODBUS_RESPONSE_BUFFER_SIZE],
    /// Number of meaningful bytes currently held for reading (the request).
    len: usize,
    read_pos: usize,
    write_pos: usize,
    ready: bool,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; MODBUS_RESPONSE_BUFFER_SIZE],
            len: 0,
            read_pos: 0,
            write_pos: 0,
            ready: false,
        }
    }

    /// Load a freshly received PDU into the buffer and mark it ready for
    /// dispatch. Resets both cursors.
    pub fn load_request(&mut self, pdu: &[u8]) -> ModbusResult<()> {
        if pdu.len() > self.data.len() {
            return Err(ModbusError::Protocol {
                message: format!(
                    "request too large: {} bytes (capacity {})",
                    pdu.len(),
                    self.data.len()
                ),
            });
        }
        self.data[..pdu.len()].copy_from_slice(pdu);
        self.len = pdu.len();
        self.read_pos = 0;
        self.write_pos = 0;
        self.ready = true;
        Ok(())
    }

    /// `IsReady`: a full PDU has been placed in the buffer.
    pub fn is_ready(&self) -> bool {
        self.ready && self.len > 0
    }

    /// Number of request bytes available to read.
    pub fn request_len(&self) -> usize {
        self.len
    }

    /// Reset the writer cursor to 0. Called at dispatch entry; the reader
    /// cursor is left untouched so the function-code byte already consumed
    /// by the dispatcher is not re-read by a processor.
    pub fn seek_writer(&mut self, pos: usize) {
        self.write_pos = pos;
    }

    /// Mark the buffer idle again after the response has been handed to the
    /// transport, ready to receive the next request.
    pub fn clear(&mut self) {
        self.len = 0;
        self.read_pos = 0;
        self.write_pos = 0;
        self.ready = false;
    }

    // -- reader ---------------------------------------------------------

    fn ensure_readable(&self, n: usize) -> ModbusResult<()> {
        if self.read_pos + n > self.len {
            return Err(ModbusError::Protocol {
                message: format!(
                    "request truncated: need {} bytes at offset {}, have {}",
                    n, self.read_pos, self.len
                ),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> ModbusResult<u8> {
        self.ensure_readable(1)?;
        let b = self.data[self.read_pos];
        self.read_pos += 1;
        Ok(b)
    }

    /// Big-endian 16-bit read (used for addresses and quantities).
    pub fn read_u16_be(&mut self) -> ModbusResult<u16> {
        self.ensure_readable(2)?;
        let hi = self.data[self.read_pos];
        let lo = self.data[self.read_pos + 1];
        self.read_pos += 2;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Raw word read with no byte-swap, used for the write-single-coil
    /// value field (0x0000/0xFF00 is symmetric under swap so this is
    /// identical to `read_u16_be` in practice, but kept distinct to mirror
    /// spec's wire-contract wording).
    pub fn read_u16_raw(&mut self) -> ModbusResult<u16> {
        self.read_u16_be()
    }

    /// Signed 16-bit read (write-single-register value).
    pub fn read_i16(&mut self) -> ModbusResult<i16> {
        Ok(self.read_u16_be()? as i16)
    }

    pub fn read_bytes(&mut self, n: usize) -> ModbusResult<&[u8]> {
        self.ensure_readable(n)?;
        let slice = &self.data[self.read_pos..self.read_pos + n];
        self.read_pos += n;
        Ok(slice)
    }

    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.read_pos)
    }

    // -- writer -----------------------------------------------------------

    fn ensure_writable(&self, n: usize) -> ModbusResult<()> {
        if self.write_pos + n > self.data.len() {
            return Err(ModbusError::Protocol {
                message: "response would exceed buffer capacity".to_string(),
            });
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> ModbusResult<()> {
        self.ensure_writable(1)?;
        self.data[self.write_pos] = value;
        self.write_pos += 1;
        Ok(())
    }

    pub fn write_u16_be(&mut self, value: u16) -> ModbusResult<()> {
        self.ensure_writable(2)?;
        let bytes = value.to_be_bytes();
        self.data[self.write_pos] = bytes[0];
        self.data[self.write_pos + 1] = bytes[1];
        self.write_pos += 2;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> ModbusResult<()> {
        self.write_u16_be(value as u16)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> ModbusResult<()> {
        self.ensure_writable(bytes.len())?;
        self.data[self.write_pos..self.write_pos + bytes.len()].copy_from_slice(bytes);
        self.write_pos += bytes.len();
        Ok(())
    }

    /// The PDU written so far, from position 0.
    pub fn response(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Total bytes written to the response, used by the dispatcher to
    /// report the final frame length.
    pub fn response_len(&self) -> usize {
        self.write_pos
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
