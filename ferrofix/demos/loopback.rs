/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! An initiator and an acceptor talking over in-process pipes.
//!
//! Run with `RUST_LOG=debug` to see every session event:
//!
//! ```text
//! cargo run -p ferrofix --example loopback
//! ```

use ferrofix::prelude::*;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

#[derive(Clone, Default)]
struct Pipe {
    queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
    closed: Arc<AtomicBool>,
}

impl Responder for Pipe {
    fn send(&self, data: &[u8]) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.queue.lock().push_back(data.to_vec());
        true
    }

    fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn remote_address(&self) -> Option<String> {
        Some("loopback".to_string())
    }
}

impl Pipe {
    fn drain_into(&self, session: &Session) -> usize {
        let mut moved = 0;
        loop {
            let Some(raw) = self.queue.lock().pop_front() else {
                return moved;
            };
            if let Err(error) = session.receive(&raw) {
                warn!(session = %session.session_id(), %error, "receive failed");
            }
            moved += 1;
        }
    }
}

struct Exchange;

impl Application for Exchange {
    fn from_app(&self, message: &Message, session_id: &SessionId) -> std::result::Result<(), ApplicationError> {
        info!(
            session = %session_id,
            msg_type = message.msg_type().unwrap_or_default(),
            seq = message.msg_seq_num().unwrap_or_default(),
            "order received"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let client_id = SessionId::new("FIX.4.4", "CLIENT", "EXCHANGE");
    let server_id = SessionId::new("FIX.4.4", "EXCHANGE", "CLIENT");
    let engine = EngineBuilder::new()
        .with_application(Exchange)
        .add_session(
            SessionConfig::new(client_id.clone())
                .with_initiator(true)
                .with_heartbeat_interval(Duration::from_secs(1)),
        )
        .add_session(SessionConfig::new(server_id.clone()))
        .with_tick_period(Duration::from_millis(200))
        .build()?;

    let client = engine.registry().get(&client_id)?;
    let server = engine.registry().get(&server_id)?;
    let to_server = Pipe::default();
    let to_client = Pipe::default();
    client.set_responder(Box::new(to_server.clone()));
    server.set_responder(Box::new(to_client.clone()));

    let driver = engine.start();
    for round in 0..20 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        to_server.drain_into(&server);
        to_client.drain_into(&client);
        if round == 5 && client.is_logged_on() {
            let mut order = Message::of_type(&MsgType::NewOrderSingle);
            order.body_mut().set_string(tags::CL_ORD_ID, "ORD-1")?;
            client.send(order)?;
        }
    }

    client.logout(Some("demo finished"));
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        to_server.drain_into(&server);
        to_client.drain_into(&client);
    }
    info!(client = ?client.status(), server = ?server.status(), "final status");
    engine.shutdown(driver).await;
    Ok(())
}
