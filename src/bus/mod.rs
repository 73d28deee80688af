//! Hermes transport over MQTT.
//!
//! Listens on `hermes/intent/#`, hands each intent this skill understands
//! to an [`IntentHandler`], and ends the dialogue session with the reply
//! text so the TTS service speaks it. Intents are handled one at a time,
//! in arrival order.

use std::time::Duration;

use anyhow::{Context, Result};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::MqttConfig;
use crate::consts::{END_SESSION_TOPIC, INTENT_TOPIC};
use crate::intent::{Command, IntentMessage};
use crate::skill::IntentHandler;

/// How long shutdown waits for the DISCONNECT packet to go out.
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Payload for `hermes/dialogueManager/endSession`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSession {
    pub session_id: String,
    pub text: String,
}

/// How replies are phrased around the handler.
#[derive(Debug, Clone)]
pub struct Dialogue {
    pub default_list: String,
    pub failure_phrase: String,
}

impl Dialogue {
    /// Decode one intent payload and produce the session-ending reply.
    ///
    /// `None` when the payload isn't an intent or the intent belongs to
    /// some other skill. Handler errors are logged and answered with the
    /// failure phrase.
    pub async fn respond(&self, handler: &dyn IntentHandler, payload: &[u8]) -> Option<EndSession> {
        let msg: IntentMessage = match serde_json::from_slice(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("ignoring malformed intent payload: {e}");
                return None;
            }
        };

        let Some(command) = Command::from_intent(&msg, &self.default_list) else {
            debug!("ignoring intent {}", msg.intent.intent_name);
            return None;
        };
        info!(
            "intent {} (confidence {:.2}): \"{}\"",
            msg.short_name(),
            msg.intent.confidence_score,
            msg.input
        );

        let text = match handler.handle(&command).await {
            Ok(text) => text,
            Err(e) => {
                error!("{} failed: {e:#}", command.kind());
                self.failure_phrase.clone()
            }
        };
        Some(EndSession {
            session_id: msg.session_id,
            text,
        })
    }
}

/// Connect to the broker and serve intents until Ctrl+C.
pub async fn run(config: &MqttConfig, dialogue: &Dialogue, handler: &dyn IntentHandler) -> Result<()> {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 16);

    info!("connecting to MQTT broker at {}:{}", config.host, config.port);

    loop {
        tokio::select! {
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // Subscriptions don't survive a reconnect with a clean session.
                    client
                        .try_subscribe(INTENT_TOPIC, QoS::AtLeastOnce)
                        .context("failed to subscribe to intents")?;
                    info!("connected, listening on {INTENT_TOPIC}");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Some(reply) = dialogue.respond(handler, &publish.payload).await else {
                        continue;
                    };
                    let payload = serde_json::to_vec(&reply)?;
                    client
                        .try_publish(END_SESSION_TOPIC, QoS::AtLeastOnce, false, payload)
                        .context("failed to publish end of session")?;
                    debug!("replied to session {}: {}", reply.session_id, reply.text);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MQTT connection error: {e}, retrying");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    if let Err(e) = client.disconnect().await {
        warn!("failed to request MQTT disconnect: {e}");
    } else if !flush_disconnect(&mut eventloop).await {
        warn!("MQTT disconnect was not sent cleanly");
    }
    Ok(())
}

/// Drive the event loop until a queued disconnect has been written.
/// `false` if the connection failed or the grace period ran out first.
async fn flush_disconnect(eventloop: &mut EventLoop) -> bool {
    let sent = tokio::time::timeout(DISCONNECT_GRACE, async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => return true,
                Ok(_) => {}
                Err(e) => {
                    debug!("event loop stopped before disconnect: {e}");
                    return false;
                }
            }
        }
    })
    .await;
    sent.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_session_uses_hermes_field_names() {
        let reply = EndSession {
            session_id: "abc".to_string(),
            text: "Added milk.".to_string(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["text"], "Added milk.");
    }

    #[tokio::test]
    async fn flush_disconnect_gives_up_without_a_broker() {
        let options = MqttOptions::new("groceries-skill-test", "127.0.0.1", 1);
        let (client, mut eventloop) = AsyncClient::new(options, 4);
        client.disconnect().await.unwrap();

        let started = std::time::Instant::now();
        assert!(!flush_disconnect(&mut eventloop).await);
        assert!(started.elapsed() <= DISCONNECT_GRACE + Duration::from_secs(1));
    }
}
