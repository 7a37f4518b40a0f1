//! Platform-agnostic media output trait
//!
//! Abstracts the audio element that actually fetches, decodes and plays
//! media (an `HTMLAudioElement` in the browser, a native player elsewhere).

use crate::error::Result;
use crate::types::LoadToken;

/// Platform media output
///
/// The session mirrors every transport change onto the output. Outputs
/// report progress back asynchronously as [`MediaEvent`]s tagged with the
/// token passed to `load`.
///
/// [`MediaEvent`]: crate::events::MediaEvent
pub trait MediaOutput {
    /// Start fetching a media reference
    ///
    /// # Arguments
    /// * `token` - Tag to put on every event about this media
    /// * `url` - Playable media reference
    ///
    /// # Returns
    /// * `Ok(())` - Load started (success or failure may still be reported later)
    /// * `Err(_)` - Output refused the media outright
    fn load(&mut self, token: LoadToken, url: &str) -> Result<()>;

    /// Start or resume output
    ///
    /// Browsers can refuse to start audio (autoplay rules); that is reported
    /// as an error and treated like a load failure.
    fn play(&mut self) -> Result<()>;

    /// Pause output
    fn pause(&mut self);

    /// Jump to a position in seconds
    fn seek(&mut self, seconds: f64);

    /// Set output volume (0.0-1.0, already muted/clamped by the session)
    fn set_volume(&mut self, level: f32);
}

impl<T: MediaOutput + ?Sized> MediaOutput for Box<T> {
    fn load(&mut self, token: LoadToken, url: &str) -> Result<()> {
        (**self).load(token, url)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds);
    }

    fn set_volume(&mut self, level: f32) {
        (**self).set_volume(level);
    }
}

/// Output that discards everything
///
/// For headless sessions where only the logical state matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl MediaOutput for NullOutput {
    fn load(&mut self, _token: LoadToken, _url: &str) -> Result<()> {
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _seconds: f64) {}

    fn set_volume(&mut self, _level: f32) {}
}
