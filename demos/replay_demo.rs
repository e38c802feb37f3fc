//! Replay Demo: Plays a scrambled, partly duplicated response through the driver.
//!
//! Fragments are delivered out of order with jitter, a few are delivered
//! twice, and an info message is interleaved. The terminal shows them in
//! order with a typing cadence.
//!
//! Run with `RUST_LOG=typecast=debug` to watch reassembly decisions.

use std::time::Duration;
use tracing_subscriber::EnvFilter;
use typecast::{
    Conversation, Driver, ReplayActor, ScriptedFrame, SessionGrant, StreamConfig, TerminalSink,
};

/// Sample response (simulating an assistant reply).
const SAMPLE_TEXT: &str = "Your current plan is billed monthly. \
Based on last quarter's usage, switching to the time-of-use tariff \
would lower your bill by roughly 12%, mostly because your heaviest \
consumption falls after 9pm. Want me to prepare the switch?";

/// Acquisition response a session collaborator would return.
const GRANT_JSON: &str = r#"{"sessionId":"demo-7f3a","welcomeMessage":"Hello! Ask me anything about your electricity plan."}"#;

fn chunk(index: usize, text: &str) -> String {
    serde_json::json!({ "type": "TEXT_CHUNK", "index": index, "text": text }).to_string()
}

/// Split into word-sized fragments and deliver them scrambled.
fn script() -> Vec<ScriptedFrame> {
    let fragments: Vec<String> = SAMPLE_TEXT
        .split_inclusive(' ')
        .map(str::to_owned)
        .collect();

    let mut order: Vec<usize> = (0..fragments.len()).collect();
    // Swap neighbours and push every seventh fragment late.
    for pair in order.chunks_mut(2) {
        pair.reverse();
    }
    let (late, mut on_time): (Vec<usize>, Vec<usize>) =
        order.into_iter().partition(|index| index % 7 == 3);
    on_time.extend(late);

    let mut script = vec![ScriptedFrame::new(
        Duration::from_millis(300),
        r#"{"type":"TEXT_START"}"#,
    )];
    for (step, &index) in on_time.iter().enumerate() {
        let jitter = Duration::from_millis(20 + (step as u64 * 37) % 60);
        script.push(ScriptedFrame::new(jitter, chunk(index, &fragments[index])));
        if step % 9 == 4 {
            // At-least-once delivery: redeliver the same fragment.
            script.push(ScriptedFrame::new(Duration::ZERO, chunk(index, &fragments[index])));
        }
        if step == 12 {
            script.push(ScriptedFrame::new(
                Duration::ZERO,
                r#"{"type":"SYSTEM_MESSAGE","text":"An agent is reviewing this chat."}"#,
            ));
        }
    }
    script.push(ScriptedFrame::new(Duration::from_millis(50), r#"{"type":"TEXT_END"}"#));
    script
}

fn main() -> typecast::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let grant = SessionGrant::from_json(GRANT_JSON)?;
    let config = StreamConfig::from_env();
    let conversation = Conversation::open(grant, config, TerminalSink::stdout());

    let (driver, frames) = Driver::with_channel(conversation);
    let replay = ReplayActor::spawn(script(), frames);

    let conversation = driver.run();
    let delivered = replay.join();
    tracing::info!(delivered, malformed = conversation.malformed_frames(), "replay complete");

    let mut sink = conversation.into_sink();
    if let Some(err) = sink.take_error() {
        return Err(err.into());
    }
    Ok(())
}
