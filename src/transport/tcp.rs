//! Modbus/TCP framing: MBAP header around a raw PDU
//!
//! `transaction_id(2) | protocol_id(2) | length(2) | unit_id(1) | pdu`. The
//! codec only frames; it has no notion of function codes or exceptions,
//! unlike the source transport this was adapted from, which decoded all the
//! way to typed request/response enums in the codec layer itself.

use bytes::{Buf, BufMut, BytesMut};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Decoder, Encoder, Framed};

use crate::error::{ModbusError, ModbusResult};

use super::{ReceivedFrame, RequestTransport};

const MBAP_HEAD_LEN: usize = 7;

#[derive(Debug, Default)]
pub struct MbapCodec {
    transaction_id: u16,
}

impl MbapCodec {
    /// The transaction id of the most recently decoded frame.
    pub fn transaction_id(&self) -> u16 {
        self.transaction_id
    }
}

impl Decoder for MbapCodec {
    type Item = ReceivedFrame;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::io::Result<Option<ReceivedFrame>> {
        if src.len() < MBAP_HEAD_LEN {
            return Ok(None);
        }

        let length = u16::from_be_bytes([src[4], src[5]]) as usize;
        if length == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "MBAP length field is zero",
            ));
        }

        let total_len = 6 + length;
        if src.len() < total_len {
            return Ok(None);
        }

        let mut head = src.copy_to_bytes(6);
        self.transaction_id = head.get_u16();
        let _protocol_id = head.get_u16();
        let _length = head.get_u16();

        let unit = src.get_u8();
        let pdu = src.copy_to_bytes(length - 1).to_vec();

        Ok(Some(ReceivedFrame { unit, pdu }))
    }
}

impl Encoder<(u16, u8, Vec<u8>)> for MbapCodec {
    type Error = std::io::Error;

    fn encode(
        &mut self,
        (transaction_id, unit, pdu): (u16, u8, Vec<u8>),
        dst: &mut BytesMut,
    ) -> std::io::Result<()> {
        dst.put_u16(transaction_id);
        dst.put_u16(0); // protocol id, always 0 for Modbus
        dst.put_u16((pdu.len() + 1) as u16);
        dst.put_u8(unit);
        dst.put_slice(&pdu);
        Ok(())
    }
}

/// One accepted TCP connection, framed with [`MbapCodec`].
///
/// Echoes back the transaction id of the most recently received request, per
/// the MBAP request/response pairing contract.
pub struct TcpRequestTransport {
    framed: Framed<TcpStream, MbapCodec>,
    last_transaction_id: u16,
}

impl TcpRequestTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            framed: Framed::new(stream, MbapCodec::default()),
            last_transaction_id: 0,
        }
    }
}

impl RequestTransport for TcpRequestTransport {
    async fn recv(&mut self) -> ModbusResult<Option<ReceivedFrame>> {
        use futures::StreamExt;

        match self.framed.next().await {
            Some(Ok(frame)) => {
                self.last_transaction_id = self.framed.codec().transaction_id();
                Ok(Some(frame))
            }
            Some(Err(err)) => Err(ModbusError::Io {
                message: err.to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn send(&mut self, unit: u8, pdu: &[u8]) -> ModbusResult<()> {
        use futures::SinkExt;

        self.framed
            .send((self.last_transaction_id, unit, pdu.to_vec()))
            .await
            .map_err(|err| ModbusError::Io {
                message: err.to_string(),
            })
    }
}

/// Accept connections on `listener` and dispatch each through `server`,
/// spawning one [`crate::handler::ModbusRequestHandler`] per connection.
///
/// Runs until the listener errors or `cancel` is triggered; each connection
/// handler shares `cancel` so a single shutdown signal stops every
/// in-flight connection.
pub async fn serve_tcp(
    listener: TcpListener,
    server: crate::server::ModbusServer,
    cancel: tokio_util::sync::CancellationToken,
) -> ModbusResult<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            accepted = listener.accept() => {
                let (stream, _addr) = accepted.map_err(|err| ModbusError::Io {
                    message: err.to_string(),
                })?;
                let transport = TcpRequestTransport::new(stream);
                let handler = crate::handler::ModbusRequestHandler::new(server.clone())
                    .with_cancellation(cancel.clone());
                tokio::spawn(async move {
                    if let Err(err) = handler.run(transport).await {
                        tracing::warn!(error = %err, "connection handler exited with error");
                    }
                });
            }
        }
    }
}
