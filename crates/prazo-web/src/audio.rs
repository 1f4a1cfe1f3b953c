use gloo::timers::future::TimeoutFuture;
use thiserror::Error;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
  AudioContext,
  AudioContextState,
  OscillatorType
};

const CUE_FREQUENCY_HZ: f32 = 880.0;
const CUE_GAIN: f32 = 0.2;
const CUE_SECONDS: f64 = 0.3;
const CUE_SETTLE_MS: u32 = 400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CueError {
  #[error(
    "audio context stayed suspended \
     (autoplay blocked until a user \
     gesture)"
  )]
  Blocked,

  #[error("audio context was closed")]
  Closed,

  #[error("audio context in state {0}")]
  Unexpected(String),

  #[error("web audio call failed: {0}")]
  Js(String)
}

impl From<JsValue> for CueError {
  fn from(value: JsValue) -> Self {
    CueError::Js(format!("{value:?}"))
  }
}

/// Whether a context in `state` is
/// actually producing sound.
pub fn check_state(
  state: AudioContextState
) -> Result<(), CueError> {
  match state {
    | AudioContextState::Running => {
      Ok(())
    }
    | AudioContextState::Suspended => {
      Err(CueError::Blocked)
    }
    | AudioContextState::Closed => {
      Err(CueError::Closed)
    }
    | other => Err(CueError::Unexpected(
      format!("{other:?}")
    ))
  }
}

/// Plays a short synthesized tone.
/// Failures, including a rejected
/// `resume()` or an autoplay block,
/// are logged.
pub fn play_cue() {
  wasm_bindgen_futures::spawn_local(
    async {
      match sound_cue().await {
        | Ok(()) => {
          tracing::debug!(
            "audio cue played"
          );
        }
        | Err(err) => {
          tracing::warn!(
            error = %err,
            "audio cue failed"
          );
        }
      }
    }
  );
}

async fn sound_cue()
-> Result<(), CueError> {
  let ctx = AudioContext::new()?;
  let resumed =
    JsFuture::from(ctx.resume()?);

  let oscillator =
    ctx.create_oscillator()?;
  let gain = ctx.create_gain()?;
  oscillator
    .set_type(OscillatorType::Sine);
  oscillator
    .frequency()
    .set_value(CUE_FREQUENCY_HZ);
  gain.gain().set_value(CUE_GAIN);
  oscillator
    .connect_with_audio_node(&gain)?;
  gain.connect_with_audio_node(
    &ctx.destination()
  )?;

  let at = ctx.current_time();
  oscillator.start_with_when(at)?;
  oscillator
    .stop_with_when(at + CUE_SECONDS)?;

  TimeoutFuture::new(CUE_SETTLE_MS)
    .await;

  // A pending resume means the host is
  // holding the context until a user
  // gesture; only await it once it has
  // settled.
  let outcome = check_state(ctx.state());
  if outcome.is_ok() {
    resumed.await?;
  }

  JsFuture::from(ctx.close()?).await?;
  outcome
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_running_context_counts_as_played()
  {
    assert_eq!(
      check_state(
        AudioContextState::Running
      ),
      Ok(())
    );
    assert_eq!(
      check_state(
        AudioContextState::Suspended
      ),
      Err(CueError::Blocked)
    );
    assert_eq!(
      check_state(
        AudioContextState::Closed
      ),
      Err(CueError::Closed)
    );
  }

  #[test]
  fn blocked_cue_explains_itself() {
    let message =
      CueError::Blocked.to_string();
    assert!(message.contains("autoplay"));
  }
}
