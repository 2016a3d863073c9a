use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    buffer::SampleBuffer,
    config::StudioConfig,
    engine::command::{CommandReceiver, SessionCommand},
    error::{GraphError, SessionError},
    genre::effects::{self, GenreEffectSpec},
    graph::{chain::EffectChain, gain::GainNode, node::GraphNode, RenderCtx},
    spectrum::{self, SpectrumHandle, SpectrumTap, DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING},
    synth::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE},
    MAX_BLOCK_SIZE,
};

/*
Live Audio Session
==================

The session is the one place live audio is mixed. It owns every loaded
source, their effect chains and spectrum taps, and renders interleaved output
blocks for the device callback.

Per source, per block:

    buffer ──→ chain (one per channel) ──→ tap (downmix) ──→ fader ──┐
                                                                     ├─→ master ─→ out
    buffer ──→ chain ──→ ...                                      ───┘

  - The tap sees the post-chain signal before the fader, so a muted lane
    still shows its spectrum.
  - A source is audible when it is not muted and either nothing is soloed or
    it is soloed itself. Inaudible sources still advance.
  - Mono sources fan out to every output channel, multi-channel sources
    feeding a mono device are averaged, otherwise channels map 1:1.

Lifecycle
---------

    Running ⇄ Suspended ──→ Closed

A suspended session renders silence and every cursor stays put. Closing drops
all sources, which also disconnects their taps. Nothing can be loaded into a
closed session.

Graph wiring is single-owner: one effect chain and one tap per source, and a
source is disconnected exactly once. The `try_*` variants log failures and
carry on so a UI can fall back (for example to synthetic spectrum bars).
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Suspended,
    Closed,
}

/// Transport and mixer snapshot of one source (Copy, allocation-free).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceStatus {
    pub id: SourceId,
    pub position: f64,
    pub duration: f64,
    pub playing: bool,
    pub finished: bool,
    pub volume: f32,
    pub muted: bool,
    pub solo: bool,
    pub connected: bool,
}

struct Source {
    id: SourceId,
    buffer: SampleBuffer,
    cursor: usize,
    playing: bool,
    fader: GainNode,
    muted: bool,
    solo: bool,
    spec: Option<&'static GenreEffectSpec>,
    chains: Vec<EffectChain>,
    tap: Option<SpectrumTap>,
    connected: bool,
}

impl Source {
    fn new(id: SourceId, buffer: SampleBuffer) -> Self {
        Self {
            id,
            buffer,
            cursor: 0,
            playing: false,
            fader: GainNode::new(1.0),
            muted: false,
            solo: false,
            spec: None,
            chains: Vec::new(),
            tap: None,
            connected: true,
        }
    }

    fn is_finished(&self) -> bool {
        self.cursor >= self.buffer.frame_count()
    }

    fn seek_frame(&mut self, frame: usize) {
        self.cursor = frame.min(self.buffer.frame_count());
        for chain in self.chains.iter_mut() {
            chain.reset();
        }
    }

    fn status(&self, sample_rate: f64) -> SourceStatus {
        SourceStatus {
            id: self.id,
            position: self.cursor as f64 / sample_rate,
            duration: self.buffer.frame_count() as f64 / sample_rate,
            playing: self.playing,
            finished: self.is_finished(),
            volume: self.fader.gain(),
            muted: self.muted,
            solo: self.solo,
            connected: self.connected,
        }
    }

    /// Render `n` frames of this source and add them onto `bus`.
    fn render_into(
        &mut self,
        lanes: &mut [Vec<f32>],
        downmix: &mut [f32],
        bus: &mut [Vec<f32>],
        n: usize,
        sample_rate: f32,
        audible: bool,
    ) {
        let start = self.cursor;
        let available = self.buffer.frame_count().saturating_sub(start).min(n);
        let source_channels = self.buffer.channel_count();
        let ctx = RenderCtx::new(sample_rate);

        for (c, lane) in lanes.iter_mut().take(source_channels).enumerate() {
            let lane = &mut lane[..n];
            lane.fill(0.0);
            if let Some(data) = self.buffer.channel(c) {
                lane[..available].copy_from_slice(&data[start..start + available]);
            }
            if let Some(chain) = self.chains.get_mut(c) {
                chain.render_block(lane, &ctx);
            }
        }

        if let Some(tap) = &self.tap {
            let mix = &mut downmix[..n];
            mix.fill(0.0);
            let scale = 1.0 / source_channels as f32;
            for lane in lanes.iter().take(source_channels) {
                for (m, &s) in mix.iter_mut().zip(&lane[..n]) {
                    *m += s * scale;
                }
            }
            tap.observe(mix);
        }

        self.cursor = start + available;
        if self.is_finished() {
            self.playing = false;
        }

        if !audible {
            return;
        }

        for lane in lanes.iter_mut().take(source_channels) {
            self.fader.render_block(&mut lane[..n], &ctx);
        }

        let output_channels = bus.len();
        for (o, bus_lane) in bus.iter_mut().enumerate() {
            let bus_lane = &mut bus_lane[..n];
            if source_channels == 1 {
                add(bus_lane, &lanes[0][..n], 1.0);
            } else if output_channels == 1 {
                let scale = 1.0 / source_channels as f32;
                for lane in lanes.iter().take(source_channels) {
                    add(bus_lane, &lane[..n], scale);
                }
            } else if o < source_channels {
                add(bus_lane, &lanes[o][..n], 1.0);
            }
        }
    }
}

#[inline]
fn add(dst: &mut [f32], src: &[f32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += s * scale;
    }
}

/// Owns and mixes every live source.
pub struct AudioSession {
    sample_rate: u32,
    output_channels: usize,
    state: SessionState,
    master: GainNode,
    fft_size: usize,
    smoothing: f32,
    sources: Vec<Source>,
    next_id: u32,
    /// Per source-channel scratch
    lanes: Vec<Vec<f32>>,
    downmix: Vec<f32>,
    /// Per output-channel accumulation
    bus: Vec<Vec<f32>>,
}

pub const DEFAULT_MASTER_GAIN: f32 = 0.7;

impl AudioSession {
    /// Open a running session, failing fast when the output format cannot
    /// be served.
    pub fn open(sample_rate: u32, output_channels: usize) -> Result<Self, SessionError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(SessionError::Unsupported {
                reason: format!("sample rate {sample_rate} Hz"),
            });
        }
        if output_channels == 0 {
            return Err(SessionError::Unsupported {
                reason: "no output channels".into(),
            });
        }

        info!(sample_rate, output_channels, "audio session opened");

        Ok(Self {
            sample_rate,
            output_channels,
            state: SessionState::Running,
            master: GainNode::new(DEFAULT_MASTER_GAIN),
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            sources: Vec::new(),
            next_id: 0,
            lanes: Vec::new(),
            downmix: vec![0.0; MAX_BLOCK_SIZE],
            bus: vec![vec![0.0; MAX_BLOCK_SIZE]; output_channels],
        })
    }

    /// Open at the device's format with gain and analyser settings from
    /// `config`.
    pub fn with_config(
        config: &StudioConfig,
        sample_rate: u32,
        output_channels: usize,
    ) -> Result<Self, SessionError> {
        let mut session = Self::open(sample_rate, output_channels)?;
        session.master.set_gain(config.master_gain);
        session.fft_size = config.fft_size;
        session.smoothing = config.smoothing;
        Ok(session)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => Err(SessionError::Closed),
            _ => {
                self.state = SessionState::Running;
                Ok(())
            }
        }
    }

    pub fn suspend(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => Err(SessionError::Closed),
            _ => {
                self.state = SessionState::Suspended;
                Ok(())
            }
        }
    }

    /// Drop every source. Idempotent.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            info!(sources = self.sources.len(), "audio session closed");
        }
        self.state = SessionState::Closed;
        self.sources.clear();
    }

    pub fn master_gain(&self) -> f32 {
        self.master.gain()
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master.set_gain(gain);
    }

    /// Add a paused source. Buffers at another rate are resampled first.
    pub fn load(&mut self, buffer: &SampleBuffer) -> Result<SourceId, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }

        let buffer = buffer.resampled(self.sample_rate)?;
        while self.lanes.len() < buffer.channel_count() {
            self.lanes.push(vec![0.0; MAX_BLOCK_SIZE]);
        }

        let id = SourceId(self.next_id);
        self.next_id += 1;
        debug!(
            source = %id,
            channels = buffer.channel_count(),
            frames = buffer.frame_count(),
            "source loaded"
        );
        self.sources.push(Source::new(id, buffer));
        Ok(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.iter().map(|s| s.id)
    }

    fn source(&self, id: SourceId) -> Result<&Source, GraphError> {
        self.sources
            .iter()
            .find(|s| s.id == id)
            .ok_or(GraphError::UnknownSource(id))
    }

    fn source_mut(&mut self, id: SourceId) -> Result<&mut Source, GraphError> {
        self.sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(GraphError::UnknownSource(id))
    }

    fn connected_mut(&mut self, id: SourceId) -> Result<&mut Source, GraphError> {
        let source = self.source_mut(id)?;
        if !source.connected {
            return Err(GraphError::Disconnected(id));
        }
        Ok(source)
    }

    // ---- transport ----

    /// Start playback; a finished source starts over.
    pub fn play(&mut self, id: SourceId) -> Result<(), GraphError> {
        let source = self.connected_mut(id)?;
        if source.is_finished() {
            source.seek_frame(0);
        }
        source.playing = true;
        Ok(())
    }

    pub fn pause(&mut self, id: SourceId) -> Result<(), GraphError> {
        self.source_mut(id)?.playing = false;
        Ok(())
    }

    pub fn toggle_pause(&mut self, id: SourceId) -> Result<bool, GraphError> {
        if self.source(id)?.playing {
            self.pause(id)?;
            Ok(false)
        } else {
            self.play(id)?;
            Ok(true)
        }
    }

    pub fn restart(&mut self, id: SourceId) -> Result<(), GraphError> {
        self.connected_mut(id)?.seek_frame(0);
        self.play(id)
    }

    /// Move to `seconds`, clamped to the source length.
    pub fn seek(&mut self, id: SourceId, seconds: f64) -> Result<(), GraphError> {
        let rate = self.sample_rate as f64;
        let source = self.source_mut(id)?;
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        source.seek_frame((seconds * rate).round() as usize);
        Ok(())
    }

    pub fn seek_by(&mut self, id: SourceId, delta: f64) -> Result<(), GraphError> {
        let position = self.position(id)?;
        self.seek(id, position + delta)
    }

    pub fn position(&self, id: SourceId) -> Result<f64, GraphError> {
        Ok(self.source(id)?.cursor as f64 / self.sample_rate as f64)
    }

    pub fn duration(&self, id: SourceId) -> Result<f64, GraphError> {
        Ok(self.source(id)?.buffer.frame_count() as f64 / self.sample_rate as f64)
    }

    pub fn is_playing(&self, id: SourceId) -> Result<bool, GraphError> {
        Ok(self.source(id)?.playing)
    }

    pub fn is_finished(&self, id: SourceId) -> Result<bool, GraphError> {
        Ok(self.source(id)?.is_finished())
    }

    pub fn status(&self, id: SourceId) -> Option<SourceStatus> {
        let rate = self.sample_rate as f64;
        self.source(id).ok().map(|s| s.status(rate))
    }

    // ---- mixer ----

    pub fn volume(&self, id: SourceId) -> Result<f32, GraphError> {
        Ok(self.source(id)?.fader.gain())
    }

    pub fn set_volume(&mut self, id: SourceId, volume: f32) -> Result<(), GraphError> {
        self.source_mut(id)?.fader.set_gain(volume);
        Ok(())
    }

    pub fn set_muted(&mut self, id: SourceId, muted: bool) -> Result<(), GraphError> {
        self.source_mut(id)?.muted = muted;
        Ok(())
    }

    pub fn toggle_mute(&mut self, id: SourceId) -> Result<bool, GraphError> {
        let source = self.source_mut(id)?;
        source.muted = !source.muted;
        Ok(source.muted)
    }

    pub fn set_solo(&mut self, id: SourceId, solo: bool) -> Result<(), GraphError> {
        self.source_mut(id)?.solo = solo;
        Ok(())
    }

    pub fn toggle_solo(&mut self, id: SourceId) -> Result<bool, GraphError> {
        let source = self.source_mut(id)?;
        source.solo = !source.solo;
        Ok(source.solo)
    }

    fn any_solo(&self) -> bool {
        self.sources.iter().any(|s| s.solo && s.connected)
    }

    pub fn is_audible(&self, id: SourceId) -> Result<bool, GraphError> {
        let any_solo = self.any_solo();
        let source = self.source(id)?;
        Ok(source.connected && !source.muted && (!any_solo || source.solo))
    }

    // ---- graph wiring ----

    /// Wire the genre's effect chain after the source. At most once per
    /// source; unknown genres get the default chain.
    pub fn attach_genre(&mut self, id: SourceId, genre: &str) -> Result<&'static GenreEffectSpec, GraphError> {
        let source = self.connected_mut(id)?;
        if source.spec.is_some() {
            return Err(GraphError::AlreadyAttached(id));
        }

        let spec = effects::lookup(genre);
        source.chains = (0..source.buffer.channel_count()).map(|_| spec.build()).collect();
        source.spec = Some(spec);

        info!(source = %id, requested = genre, genre = spec.name, stages = spec.stages.len(), "effect chain attached");
        Ok(spec)
    }

    pub fn try_attach_genre(&mut self, id: SourceId, genre: &str) -> Option<&'static GenreEffectSpec> {
        match self.attach_genre(id, genre) {
            Ok(spec) => Some(spec),
            Err(err) => {
                warn!(source = %id, error = %err, "effect chain not attached");
                None
            }
        }
    }

    pub fn genre(&self, id: SourceId) -> Option<&'static GenreEffectSpec> {
        self.source(id).ok().and_then(|s| s.spec)
    }

    /// Tap the source for spectrum readings. At most once per source.
    pub fn attach_tap(&mut self, id: SourceId) -> Result<SpectrumHandle, GraphError> {
        let (fft_size, smoothing) = (self.fft_size, self.smoothing);
        let source = self.connected_mut(id)?;
        if source.tap.is_some() {
            return Err(GraphError::AlreadyTapped(id));
        }

        let (tap, handle) = spectrum::tap(fft_size, smoothing);
        source.tap = Some(tap);
        debug!(source = %id, fft_size, "spectrum tap attached");
        Ok(handle)
    }

    pub fn try_attach_tap(&mut self, id: SourceId) -> Option<SpectrumHandle> {
        match self.attach_tap(id) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(source = %id, error = %err, "spectrum tap unavailable");
                None
            }
        }
    }

    /// Tear down the source's chain and tap and silence it. Exactly once.
    pub fn disconnect(&mut self, id: SourceId) -> Result<(), GraphError> {
        let source = self.connected_mut(id)?;
        source.connected = false;
        source.playing = false;
        source.solo = false;
        source.chains.clear();
        source.tap = None;
        info!(source = %id, "source disconnected");
        Ok(())
    }

    pub fn try_disconnect(&mut self, id: SourceId) -> bool {
        match self.disconnect(id) {
            Ok(()) => true,
            Err(err) => {
                warn!(source = %id, error = %err, "disconnect ignored");
                false
            }
        }
    }

    // ---- control ----

    /// Apply one command. Returns whether it took effect.
    pub fn apply(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Play(id) => self.play(id).is_ok(),
            SessionCommand::Pause(id) => self.pause(id).is_ok(),
            SessionCommand::TogglePause(id) => self.toggle_pause(id).is_ok(),
            SessionCommand::ToggleMute(id) => self.toggle_mute(id).is_ok(),
            SessionCommand::ToggleSolo(id) => self.toggle_solo(id).is_ok(),
            SessionCommand::Restart(id) => self.restart(id).is_ok(),
            SessionCommand::Seek { source, seconds } => self.seek(source, seconds).is_ok(),
            SessionCommand::SeekBy { source, seconds } => self.seek_by(source, seconds).is_ok(),
            SessionCommand::SetVolume { source, volume } => self.set_volume(source, volume).is_ok(),
            SessionCommand::SetMasterGain(gain) => {
                self.set_master_gain(gain);
                true
            }
            SessionCommand::Suspend => self.suspend().is_ok(),
            SessionCommand::Resume => self.resume().is_ok(),
        }
    }

    /// Apply every pending command. Returns how many took effect.
    pub fn drain<R: CommandReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut applied = 0;
        while let Some(command) = rx.pop() {
            if self.apply(command) {
                applied += 1;
            }
        }
        applied
    }

    // ---- rendering ----

    /// Mix every playing source into an interleaved block of
    /// `output_channels` samples per frame.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.state != SessionState::Running {
            return;
        }

        let channels = self.output_channels;
        let frames = out.len() / channels;
        let any_solo = self.any_solo();
        let sample_rate = self.sample_rate as f32;
        let mut written = 0;

        while written < frames {
            let n = (frames - written).min(MAX_BLOCK_SIZE);
            for lane in self.bus.iter_mut() {
                lane[..n].fill(0.0);
            }

            for source in self.sources.iter_mut() {
                if !source.playing || !source.connected {
                    continue;
                }
                let audible = !source.muted && (!any_solo || source.solo);
                source.render_into(&mut self.lanes, &mut self.downmix, &mut self.bus, n, sample_rate, audible);
            }

            let ctx = RenderCtx::new(sample_rate);
            for lane in self.bus.iter_mut() {
                self.master.render_block(&mut lane[..n], &ctx);
            }

            let block = &mut out[written * channels..(written + n) * channels];
            for (i, frame) in block.chunks_exact_mut(channels).enumerate() {
                for (sample, lane) in frame.iter_mut().zip(&self.bus) {
                    *sample = lane[i];
                }
            }

            written += n;
        }
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.close();
    }
}
