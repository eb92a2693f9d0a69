//! Readiness multiplexing over the listener and all live connections
//!
//! One task watches every socket at once: each wait builds an interest set
//! out of the listening socket plus one readiness future per registered
//! connection, polls them together, and hands back whatever subset became
//! ready. The wait is bounded by a fixed ceiling so the loop wakes up
//! periodically even when the chat is idle.

use std::future::{poll_fn, Future};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time;

use crate::registry::ConnectionTable;
use crate::types::ConnId;

/// One unit of readiness reported by a wait
#[derive(Debug)]
pub enum Event {
    /// The listener produced a new connection
    Incoming(TcpStream, SocketAddr),
    /// Accepting a pending connection failed; never fatal
    AcceptError(io::Error),
    /// A registered connection has pending input (or EOF)
    Readable(ConnId),
}

type ReadyFuture<'a> = Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>;

/// Block until the listener or any registered connection becomes ready,
/// or until `ceiling` elapses.
///
/// Returns every event observable in a single poll pass, listener first,
/// then connections in ascending id order. An expired ceiling yields an
/// empty set: the caller treats it as a no-op iteration, not an error.
pub async fn wait(
    listener: &TcpListener,
    table: &ConnectionTable,
    ceiling: Duration,
) -> Vec<Event> {
    match time::timeout(ceiling, ready_set(listener, table)).await {
        Ok(events) => events,
        Err(_) => Vec::new(),
    }
}

/// Poll the whole interest set until at least one member is ready.
async fn ready_set(listener: &TcpListener, table: &ConnectionTable) -> Vec<Event> {
    // Interest set for this wait. Connections registered mid-wait are
    // picked up on the next iteration, same as re-arming a select set.
    let mut interest: Vec<(ConnId, ReadyFuture<'_>)> = table
        .iter()
        .map(|conn| (conn.id(), Box::pin(conn.readable()) as ReadyFuture<'_>))
        .collect();

    poll_fn(move |cx| {
        let mut events = Vec::new();

        match listener.poll_accept(cx) {
            Poll::Ready(Ok((stream, addr))) => events.push(Event::Incoming(stream, addr)),
            Poll::Ready(Err(e)) => events.push(Event::AcceptError(e)),
            Poll::Pending => {}
        }

        for (id, fut) in interest.iter_mut() {
            if let Poll::Ready(res) = fut.as_mut().poll(cx) {
                // A readiness error is reported as readable; the failure
                // then surfaces on the read attempt and takes the normal
                // teardown path.
                let _ = res;
                events.push(Event::Readable(*id));
            }
        }

        if events.is_empty() {
            Poll::Pending
        } else {
            Poll::Ready(events)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncWriteExt;

    async fn table_with_clients(n: usize) -> (TcpListener, ConnectionTable, Vec<TcpStream>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut table = ConnectionTable::new(8);
        let mut clients = Vec::new();
        for _ in 0..n {
            let client = TcpStream::connect(addr).await.unwrap();
            let (server, peer) = listener.accept().await.unwrap();
            table.register(server, peer).unwrap();
            clients.push(client);
        }
        (listener, table, clients)
    }

    #[tokio::test]
    async fn test_wait_times_out_when_idle() {
        let (listener, table, _clients) = table_with_clients(1).await;

        let events = wait(&listener, &table, Duration::from_millis(50)).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_wait_reports_incoming_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let table = ConnectionTable::new(8);

        let _client = TcpStream::connect(addr).await.unwrap();
        let events = wait(&listener, &table, Duration::from_secs(1)).await;

        assert!(matches!(events.as_slice(), [Event::Incoming(_, _)]));
    }

    #[tokio::test]
    async fn test_wait_reports_readable_client() {
        let (listener, table, mut clients) = table_with_clients(2).await;

        clients[1].write_all(b"hi\n").await.unwrap();
        let events = wait(&listener, &table, Duration::from_secs(1)).await;

        let ready: Vec<ConnId> = events
            .iter()
            .filter_map(|e| match e {
                Event::Readable(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ready, vec![ConnId(1)]);
    }

    #[tokio::test]
    async fn test_wait_reports_eof_as_readable() {
        let (listener, table, mut clients) = table_with_clients(1).await;

        clients.remove(0).shutdown().await.unwrap();
        let events = wait(&listener, &table, Duration::from_secs(1)).await;

        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Readable(id) if *id == ConnId(0))));
    }
}
