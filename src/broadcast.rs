//! Timestamped message fan-out
//!
//! Builds the outbound line `[HH:MM:SS] <text>` and writes it to every
//! live connection except an optional excluded sender. Writes go straight
//! to the kernel socket buffers; nothing is queued or retried.

use chrono::{Local, NaiveTime};

use crate::registry::ConnectionTable;
use crate::types::{ConnId, MAX_LINE};

/// Build the outbound line: timestamp, single space, text.
///
/// The result is capped at `MAX_LINE` bytes (on a char boundary); callers
/// either keep text short enough or accept the silent truncation.
pub fn compose(now: NaiveTime, text: &str) -> String {
    let mut line = format!("{} {}", now.format("[%H:%M:%S]"), text);
    if line.len() > MAX_LINE {
        let mut end = MAX_LINE;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        line.truncate(end);
    }
    line
}

/// Send `text`, timestamped, to every live connection except `excluded`.
///
/// `None` excludes nobody, which is how system-wide announcements go out.
/// Each delivery is one unbuffered best-effort write; a slow reader gets
/// a short write that is neither detected nor corrected.
pub fn broadcast_except(table: &ConnectionTable, excluded: Option<ConnId>, text: &str) {
    let line = compose(Local::now().time(), text);
    for conn in table.iter() {
        if Some(conn.id()) == excluded {
            continue;
        }
        conn.send(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    #[test]
    fn test_compose_format() {
        let at = NaiveTime::from_hms_opt(7, 5, 9).unwrap();
        assert_eq!(compose(at, "carol> hi\n"), "[07:05:09] carol> hi\n");
    }

    #[test]
    fn test_compose_truncates_long_lines() {
        let at = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        let text = "x".repeat(400);
        let line = compose(at, &text);
        assert_eq!(line.len(), MAX_LINE);
        assert!(line.starts_with("[23:59:59] x"));
    }

    #[test]
    fn test_compose_truncates_on_char_boundary() {
        let at = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let text = "é".repeat(200);
        let line = compose(at, &text);
        assert!(line.len() <= MAX_LINE);
        assert!(line.is_char_boundary(line.len()));
    }

    async fn table_with_clients(n: usize) -> (ConnectionTable, Vec<TcpStream>) {
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
        (table, clients)
    }

    async fn read_line(stream: &mut TcpStream) -> String {
        let mut buf = [0u8; 512];
        let n = timeout(Duration::from_secs(1), stream.read(&mut buf))
            .await
            .expect("no message arrived")
            .unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    async fn assert_silent(stream: &mut TcpStream) {
        let mut buf = [0u8; 512];
        let res = timeout(Duration::from_millis(100), stream.read(&mut buf)).await;
        assert!(res.is_err(), "unexpected message delivered");
    }

    #[tokio::test]
    async fn test_broadcast_skips_excluded_sender() {
        let (table, mut clients) = table_with_clients(3).await;

        broadcast_except(&table, Some(ConnId(1)), "carol> hi\n");

        let first = read_line(&mut clients[0]).await;
        let third = read_line(&mut clients[2]).await;
        assert!(first.ends_with("carol> hi\n"));
        assert!(third.ends_with("carol> hi\n"));
        assert_silent(&mut clients[1]).await;
    }

    #[tokio::test]
    async fn test_broadcast_without_exclusion_reaches_everyone() {
        let (table, mut clients) = table_with_clients(2).await;

        broadcast_except(&table, None, "server going down\n");

        for client in clients.iter_mut() {
            let line = read_line(client).await;
            assert!(line.ends_with("server going down\n"));
        }
    }
}
