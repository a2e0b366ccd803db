use tokio::{io::AsyncWriteExt, net::TcpListener};

/// Spawn a health check listener in a non-blocking task for Docker HEALTHCHECK
pub fn spawn_healthcheck_listener(port: u16) {
    tokio::task::spawn(async move {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("fail to bind docker health listener");

        tracing::info!("Docker health check listening on port {port}");

        while let Ok((mut stream, _)) = listener.accept().await {
            tracing::debug!("New Stream Incoming");
            let res = stream.write_all(b"OK").await;
            if let Err(err) = res {
                tracing::error!("fail to response to health checker: {err}")
            }
        }
    });
}

#[tokio::test]
async fn test_healthcheck() {
    use tokio::io::AsyncReadExt;

    spawn_healthcheck_listener(11460);

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", 11460))
        .await
        .expect("fail to reach health listener");
    let mut body = Vec::new();
    stream.read_to_end(&mut body).await.unwrap();

    assert_eq!(b"OK".as_slice(), body);
}
