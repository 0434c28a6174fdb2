use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bon::Builder;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::{sync::watch, task::JoinHandle, time::timeout};
use uuid::Uuid;

use crate::{notify::Channel, prelude::*};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[must_use]
#[derive(Clone, Builder)]
pub struct BrokerConfig {
    #[builder(into)]
    hostname: String,

    port: u16,

    #[builder(into)]
    username: String,

    #[builder(into)]
    password: String,

    /// Must be unique per broker session.
    #[builder(into, default = format!("{}-{}", clap::crate_name!(), Uuid::new_v4().simple()))]
    client_id: String,

    #[builder(default = Duration::from_secs(10))]
    connect_timeout: Duration,

    /// Wait this long for the pending acknowledgements when disconnecting.
    #[builder(default = Duration::from_secs(5))]
    disconnect_timeout: Duration,

    #[builder(default = Duration::from_secs(30))]
    keep_alive: Duration,
}

/// MQTT transport backed by a single long-lived broker session.
///
/// The connection is never re-established automatically: call [`MqttChannel::connect`] again.
pub struct MqttChannel {
    config: BrokerConfig,
    client: Option<AsyncClient>,
    state: Arc<watch::Sender<ConnectionState>>,

    /// Number of enqueued QoS 1 messages not yet acknowledged by the broker.
    n_pending: Arc<watch::Sender<usize>>,

    event_loop: Option<JoinHandle<()>>,
}

impl MqttChannel {
    const REQUEST_CAPACITY: usize = 10;

    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            client: None,
            state: Arc::new(watch::Sender::new(ConnectionState::Disconnected)),
            n_pending: Arc::new(watch::Sender::new(0)),
            event_loop: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Establish the broker session and wait for the acknowledgement.
    ///
    /// On failure, the channel stays disconnected and remains usable.
    #[instrument(skip_all, fields(hostname = %self.config.hostname, port = self.config.port))]
    pub async fn connect(&mut self) -> Result {
        if self.event_loop.is_some() {
            self.disconnect().await;
        }
        self.n_pending.send_replace(0);
        self.state.send_replace(ConnectionState::Connecting);
        info!("connecting…");

        let mut options =
            MqttOptions::new(&self.config.client_id, &self.config.hostname, self.config.port);
        options.set_credentials(&self.config.username, &self.config.password);
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);

        let (client, event_loop) = AsyncClient::new(options, Self::REQUEST_CAPACITY);
        let mut receiver = self.state.subscribe();
        self.event_loop = Some(tokio::spawn(drive(
            event_loop,
            Arc::clone(&self.state),
            Arc::clone(&self.n_pending),
        )));

        let state = timeout(
            self.config.connect_timeout,
            receiver.wait_for(|state| *state != ConnectionState::Connecting),
        )
        .await
        .map(|result| result.map(|state| *state));
        match state {
            Ok(Ok(ConnectionState::Connected)) => {
                self.client = Some(client);
                info!("connected");
                Ok(())
            }
            Ok(_) => {
                self.shut_down_event_loop();
                bail!("failed to connect to the broker")
            }
            Err(_) => {
                self.shut_down_event_loop();
                bail!("timed out connecting to the broker")
            }
        }
    }

    /// Wait for the pending acknowledgements, then close the session gracefully.
    ///
    /// The event loop is only aborted when it fails to exit within the disconnect timeout.
    #[instrument(skip_all)]
    pub async fn disconnect(&mut self) {
        let Some(client) = self.client.take() else {
            self.shut_down_event_loop();
            return;
        };

        let mut n_pending = self.n_pending.subscribe();
        let mut state = self.state.subscribe();
        let drained = async {
            tokio::select! {
                _ = n_pending.wait_for(|n_pending| *n_pending == 0) => {}
                _ = state.wait_for(|state| *state != ConnectionState::Connected) => {}
            }
        };
        if timeout(self.config.disconnect_timeout, drained).await.is_err() {
            warn!(
                n_pending = *self.n_pending.borrow(),
                "timed out waiting for the acknowledgements",
            );
        }

        if let Err(error) = client.disconnect().await {
            warn!("failed to disconnect gracefully: {error}");
        }
        if let Some(mut event_loop) = self.event_loop.take()
            && timeout(self.config.disconnect_timeout, &mut event_loop).await.is_err()
        {
            warn!("the event loop did not stop in time, aborting");
            event_loop.abort();
        }
        self.state.send_replace(ConnectionState::Disconnected);
        info!("disconnected");
    }

    fn shut_down_event_loop(&mut self) {
        if let Some(event_loop) = self.event_loop.take() {
            event_loop.abort();
        }
        self.client = None;
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

impl Drop for MqttChannel {
    fn drop(&mut self) {
        if let Some(event_loop) = self.event_loop.take() {
            event_loop.abort();
        }
    }
}

#[async_trait]
impl Channel for MqttChannel {
    fn is_connected(&self) -> bool {
        self.client.is_some() && self.state() == ConnectionState::Connected
    }

    /// Enqueue the message with at-least-once delivery.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result {
        let client = self.client.as_ref().context("the client is not connected")?;

        // The acknowledgement may arrive before `publish` returns:
        self.n_pending.send_modify(|n_pending| *n_pending += 1);
        if let Err(error) = client.publish(topic, QoS::AtLeastOnce, false, payload).await {
            self.n_pending.send_modify(|n_pending| *n_pending = n_pending.saturating_sub(1));
            return Err(error).context("failed to enqueue the message");
        }
        debug!(topic, "enqueued");
        Ok(())
    }
}

/// Poll the event loop until the first transport error or the outgoing disconnect.
async fn drive(
    mut event_loop: EventLoop,
    state: Arc<watch::Sender<ConnectionState>>,
    n_pending: Arc<watch::Sender<usize>>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                state.send_replace(ConnectionState::Connected);
            }
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                debug!(pkid = ack.pkid, "acknowledged");
                n_pending.send_modify(|n_pending| *n_pending = n_pending.saturating_sub(1));
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("disconnect sent");
                break;
            }
            Ok(event) => {
                trace!(?event, "event");
            }
            Err(error) => {
                error!("connection lost: {error}");
                break;
            }
        }
    }
    state.send_replace(ConnectionState::Disconnected);
}
