//! Integration tests for cross-connection behavior.

use crate::helpers::{ServerOptions, TestServer};

#[tokio::test]
async fn concurrent_same_id_connects_have_exactly_one_winner() {
    let server = TestServer::start();

    let mut a = server.client().await;
    let mut b = server.client().await;

    a.send("CONNECT bob").await;
    b.send("CONNECT bob").await;

    let (ra, rb) = tokio::join!(a.reply(), b.reply());
    let oks = [&ra, &rb]
        .iter()
        .filter(|r| r.as_str() == "CONNECT: OK")
        .count();
    let errs = [&ra, &rb]
        .iter()
        .filter(|r| r.as_str() == "CONNECT: ERROR")
        .count();
    assert_eq!((oks, errs), (1, 1), "got {ra:?} and {rb:?}");
}

#[tokio::test]
async fn distinct_connects_respect_the_session_capacity() {
    let server = TestServer::start_with(ServerOptions {
        max_sessions: 3,
        ..ServerOptions::default()
    });

    let mut clients = Vec::new();
    let mut oks = 0;
    let mut errs = 0;
    for i in 0..5 {
        let mut c = server.client().await;
        match c.cmd(&format!("CONNECT client{i}")).await.as_str() {
            "CONNECT: OK" => oks += 1,
            "CONNECT: ERROR" => errs += 1,
            other => panic!("unexpected CONNECT reply: {other:?}"),
        }
        clients.push(c); // keep winners alive so sessions stay registered
    }

    assert_eq!(oks, 3);
    assert_eq!(errs, 2);
}

#[tokio::test]
async fn sessions_are_isolated_between_clients() {
    let server = TestServer::start();
    let mut a = server.connect_as("alice").await;
    let mut b = server.connect_as("bob").await;

    assert_eq!(a.cmd("PUT color red").await, "PUT: OK");
    assert_eq!(b.cmd("PUT color blue").await, "PUT: OK");

    assert_eq!(a.cmd("GET color").await, "red");
    assert_eq!(b.cmd("GET color").await, "blue");

    // deleting in one session does not touch the other
    assert_eq!(a.cmd("DELETE color").await, "DELETE: OK");
    assert_eq!(b.cmd("GET color").await, "blue");
}

#[tokio::test]
async fn interleaved_commands_across_sessions() {
    let server = TestServer::start();
    let mut a = server.connect_as("alice").await;
    let mut b = server.connect_as("bob").await;

    for i in 0..5 {
        assert_eq!(a.cmd(&format!("PUT k{i} a{i}")).await, "PUT: OK");
        assert_eq!(b.cmd(&format!("PUT k{i} b{i}")).await, "PUT: OK");
    }
    for i in 0..5 {
        assert_eq!(a.cmd(&format!("GET k{i}")).await, format!("a{i}"));
        assert_eq!(b.cmd(&format!("GET k{i}")).await, format!("b{i}"));
    }
}
