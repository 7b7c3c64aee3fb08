//! Drives the MBAP codec over a scripted mock I/O stream rather than a real
//! socket, using the teacher's existing `tokio-test` dev-dependency.

use futures::{SinkExt, StreamExt};
use tokio_util::codec::Framed;

use voltage_modbus::transport::tcp::MbapCodec;

#[tokio::test]
async fn decodes_a_request_scripted_byte_for_byte() {
    let mock = tokio_test::io::Builder::new()
        .read(&[
            0x00, 0x07, // transaction id
            0x00, 0x00, // protocol id
            0x00, 0x06, // length
            0x01, // unit id
            0x03, 0x00, 0x00, 0x00, 0x02, // read 2 holding registers at 0
        ])
        .build();

    let mut framed = Framed::new(mock, MbapCodec::default());
    let frame = framed.next().await.unwrap().unwrap();
    assert_eq!(frame.unit, 1);
    assert_eq!(frame.pdu, vec![0x03, 0x00, 0x00, 0x00, 0x02]);
    assert_eq!(framed.codec().transaction_id(), 7);
}

#[tokio::test]
async fn encodes_a_response_matching_the_expected_write_script() {
    let mock = tokio_test::io::Builder::new()
        .write(&[
            0x00, 0x07, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0x12, 0x34,
        ])
        .build();

    let mut framed = Framed::new(mock, MbapCodec::default());
    framed
        .send((7, 1, vec![0x03, 0x02, 0x12, 0x34]))
        .await
        .unwrap();
}
