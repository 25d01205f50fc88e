use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::connection::Connection;
use crate::context::Context;
use crate::frame::Frame;
use crate::persistence::run_background_save;
use crate::session::{Session, PUSH_CAPACITY};
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;
    let local_address = listener.local_addr()?;

    let ctx = Context::new(&config.snapshot_path, local_address.port());
    ctx.persistence.restore();

    let saver = tokio::spawn(run_background_save(
        ctx.persistence.clone(),
        config.save_interval(),
    ));

    info!("Server listening on {}", local_address);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, client_address) = accepted?;
                let ctx = ctx.clone();
                info!("Accepted connection from {:?}", client_address);

                tokio::spawn(async move {
                    ctx.stats.client_connected();
                    if let Err(e) = handle_connection(socket, client_address, ctx.clone()).await {
                        error!(error = %e, "Connection failed");
                    }
                    ctx.stats.client_disconnected();
                });
            }
            _ = ctx.shutdown.notified() => {
                info!("Shutting down");
                break;
            }
        }
    }

    saver.abort();
    Ok(())
}

#[instrument(
    name = "connection",
    skip(stream, ctx),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    ctx: Context,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    let (pushes, mut push_rx) = mpsc::channel(PUSH_CAPACITY);
    let mut session = Session::new(conn.id, ctx, pushes);

    loop {
        tokio::select! {
            read = conn.read_frame() => {
                let frame = match read {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(e) if e.is::<io::Error>() => return Err(e),
                    Err(e) => {
                        warn!("Protocol error: {}", e);
                        conn.write_frame(&Frame::error(format!("ERR Protocol error: {}", e)))?;
                        conn.flush().await?;
                        break;
                    }
                };

                debug!("Received frame from client: {:?}", frame);
                let res = session.handle(frame);
                debug!("Sending response to client: {:?}", res);

                conn.write_frame(&res)?;
                // Replies of a pipeline go out together, once the whole batch has been handled.
                if conn.is_drained() {
                    conn.flush().await?;
                }
            }
            Some(push) = push_rx.recv() => {
                conn.write_frame(&push)?;
                conn.flush().await?;
            }
        }
    }

    info!("Connection closed");
    Ok(())
}
