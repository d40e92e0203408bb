//! MQTT subscriber feeding the in-memory sensor state.
//!
//! Subscribes to `<prefix>/#` and records every numeric payload under
//! the topic suffix as its metric name. Connection trouble flips the
//! feed status flag; the event loop sleeps briefly and keeps polling,
//! which is the entire reconnect strategy.

use anyhow::{Context, Result};
use onefarmer_core::{FeedState, FeedStatus};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::MqttConfig;

pub fn spawn_subscriber(config: &MqttConfig, feed: Arc<Mutex<FeedState>>) -> Result<JoinHandle<()>> {
    let (host, port) = parse_broker_url(&config.broker_url)?;

    info!(
        broker = %config.broker_url,
        client_id = %config.client_id,
        prefix = %config.topic_prefix,
        "Starting MQTT feed subscriber"
    );

    let mut mqttoptions = MqttOptions::new(&config.client_id, host, port);
    mqttoptions.set_keep_alive(Duration::from_secs(30));

    let (client, mut event_loop) = AsyncClient::new(mqttoptions, 10);

    let topic_filter = format!("{}/#", config.topic_prefix);
    let prefix = config.topic_prefix.clone();
    let qos = qos_from_level(config.qos);

    let handle = tokio::spawn(async move {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(filter = %topic_filter, "Connected to broker, subscribing");
                    if let Err(e) = client.subscribe(&topic_filter, qos).await {
                        error!(error = %e, "Subscribe failed");
                        set_status(&feed, FeedStatus::Error);
                    } else {
                        set_status(&feed, FeedStatus::Connected);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let metric = metric_from_topic(&prefix, &publish.topic);
                    match parse_payload(&publish.payload) {
                        Some(value) => {
                            debug!(metric = %metric, value, "Sensor reading received");
                            match feed.lock() {
                                Ok(mut feed) => feed.record(&metric, value),
                                Err(_) => {
                                    warn!(metric = %metric, "Feed state lock poisoned, reading dropped");
                                }
                            }
                        }
                        None => {
                            warn!(topic = %publish.topic, "Ignoring non-numeric payload");
                        }
                    }
                }
                Ok(notification) => {
                    debug!("MQTT notification: {:?}", notification);
                }
                Err(e) => {
                    error!("MQTT connection error: {}", e);
                    set_status(&feed, FeedStatus::Error);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    set_status(&feed, FeedStatus::Connecting);
                }
            }
        }
    });

    Ok(handle)
}

fn set_status(feed: &Arc<Mutex<FeedState>>, status: FeedStatus) {
    match feed.lock() {
        Ok(mut feed) => feed.set_status(status),
        Err(_) => warn!(?status, "Feed state lock poisoned, status update dropped"),
    }
}

fn qos_from_level(level: u8) -> QoS {
    match level {
        2 => QoS::ExactlyOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

/// Metric name for a reading is its topic with the subscription prefix
/// stripped: `onefarmer/sensors/water_temp` -> `water_temp`.
fn metric_from_topic(prefix: &str, topic: &str) -> String {
    topic
        .strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(topic)
        .to_string()
}

/// Sensor nodes publish bare numbers ("21.4"); anything else is dropped.
fn parse_payload(payload: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(payload).ok()?;
    let value: f64 = text.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse MQTT broker URL into host and port
///
/// Supports:
/// - mqtt://localhost:1883
/// - mqtt://192.168.1.100:1883
/// - mqtts://broker.example.com:8883 (TLS, for future)
fn parse_broker_url(url: &str) -> Result<(String, u16)> {
    let url_without_protocol = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("mqtts://"))
        .context("Invalid MQTT URL: must start with mqtt:// or mqtts://")?;

    if let Some((host, port_str)) = url_without_protocol.split_once(':') {
        let port = port_str
            .parse::<u16>()
            .context("Invalid port number in MQTT URL")?;
        Ok((host.to_string(), port))
    } else {
        // Default port if not specified
        Ok((url_without_protocol.to_string(), 1883))
    }
}
