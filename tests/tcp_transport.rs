//! End-to-end test of the MBAP/TCP transport: a real `TcpListener` served by
//! `serve_tcp`, and a plain socket client speaking the wire format by hand.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use voltage_modbus::{serve_tcp, InMemoryStore, ModbusServer};

#[tokio::test]
async fn round_trips_a_read_holding_registers_request_over_real_tcp() {
    let mut store = InMemoryStore::new();
    store.add_unit(1, 16, 16, 16, 16);
    store.set_holding_register(1, 0, 0x1234).unwrap();
    let server = ModbusServer::new(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let serve_cancel = cancel.clone();
    let serve_task = tokio::spawn(async move { serve_tcp(listener, server, serve_cancel).await });

    let mut client = TcpStream::connect(addr).await.unwrap();
    let request = [
        0x00, 0x2A, // transaction id
        0x00, 0x00, // protocol id
        0x00, 0x06, // length
        0x01, // unit id
        0x03, 0x00, 0x00, 0x00, 0x01, // read one holding register at address 0
    ];
    client.write_all(&request).await.unwrap();

    let mut response = [0u8; 11];
    client.read_exact(&mut response).await.unwrap();

    assert_eq!(
        response,
        [0x00, 0x2A, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0x12, 0x34]
    );

    drop(client);
    cancel.cancel();
    serve_task.await.unwrap().unwrap();
}

#[tokio::test]
async fn an_unsupported_function_code_comes_back_as_an_exception_frame() {
    let mut store = InMemoryStore::new();
    store.add_unit(1, 16, 16, 16, 16);
    let server = ModbusServer::new(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let serve_cancel = cancel.clone();
    let serve_task = tokio::spawn(async move { serve_tcp(listener, server, serve_cancel).await });

    let mut client = TcpStream::connect(addr).await.unwrap();
    let request = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x01, 0x2B];
    client.write_all(&request).await.unwrap();

    let mut response = [0u8; 9];
    client.read_exact(&mut response).await.unwrap();
    assert_eq!(
        response,
        [0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01, 0xAB, 0x01]
    );

    drop(client);
    cancel.cancel();
    serve_task.await.unwrap().unwrap();
}
