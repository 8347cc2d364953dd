//! Sonification Engine: the host-facing object.
//!
//! Owns the audio context (sample clock, signal graph, voice registry), the
//! live settings, the step sequencer and the block pacer. Triggers are
//! fire-and-forget: they schedule voices against the audio clock and return.
//! The host pulls audio with [`SonificationEngine::render`] and polls
//! [`SonificationEngine::tick`] from its frame loop.

use fastrand::Rng;
use log::{debug, trace};

use crate::chain::{Block, ChainEvent, TokenTransfer, Transaction};
use crate::dsp::graph::{GraphParam, SignalGraph};
use crate::dsp::voice::{Voice, VoiceId, VoiceRegistry};
use crate::error::EngineError;
use crate::mapper::{map_contract_call, map_erc20, map_transaction};
use crate::pacing::{TransactionPacer, sample_block};
use crate::sequencer::{DEFAULT_BPM, StepSequencer};
use crate::settings::{EngineConfig, EngineSettings, SettingsPatch};
use crate::style::{self, StyleProfile};
use crate::voices::{ambient, block, contract, percussion};

/// The running audio context: exists between `init()` and `close()`.
#[derive(Debug, Clone)]
struct AudioContext {
    sample_rate: f64,
    /// Frames rendered so far; the clock.
    frame: u64,
    graph: SignalGraph,
    voices: VoiceRegistry,
    suspended: bool,
}

impl AudioContext {
    fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate
    }
}

/// Chain activity in, stereo audio out.
#[derive(Debug, Clone)]
pub struct SonificationEngine {
    config: EngineConfig,
    settings: EngineSettings,
    profile: &'static StyleProfile,
    context: Option<AudioContext>,
    closed: bool,
    muted: bool,
    paused: bool,
    sequencer: StepSequencer,
    pacer: TransactionPacer,
    rng: Rng,
}

impl SonificationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let settings = EngineSettings::default();
        SonificationEngine {
            profile: style::profile(settings.sound_style),
            sequencer: StepSequencer::new(DEFAULT_BPM),
            pacer: TransactionPacer::new(config.block_time),
            rng: Rng::with_seed(config.seed),
            settings,
            config,
            context: None,
            closed: false,
            muted: false,
            paused: false,
        }
    }

    /// Create the audio context and signal graph, and start the sequencer.
    /// Calling it again while running is a no-op.
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        if self.context.is_some() {
            return Ok(());
        }
        let sample_rate = self.config.sample_rate;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }

        let graph = SignalGraph::new(sample_rate, &self.settings, &mut self.rng);
        let context = AudioContext {
            sample_rate,
            frame: 0,
            graph,
            voices: VoiceRegistry::new(self.config.max_voices, self.config.voice_policy),
            suspended: self.paused,
        };
        self.sequencer.start(context.current_time());
        self.context = Some(context);
        debug!(
            "audio context up at {} Hz, style {}, {} voices max",
            sample_rate,
            self.settings.sound_style.name(),
            self.config.max_voices
        );
        Ok(())
    }

    /// Tear the context down for good. Later triggers are dropped and
    /// `init()` fails with [`EngineError::Closed`].
    pub fn close(&mut self) {
        if let Some(context) = self.context.take() {
            debug!(
                "audio context closed at {:.3}s with {} voices in flight",
                context.current_time(),
                context.voices.len()
            );
        }
        self.sequencer.stop();
        self.pacer.clear();
        self.closed = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Audio-clock time in seconds; 0 before `init()`.
    pub fn current_time(&self) -> f64 {
        self.context.as_ref().map_or(0.0, AudioContext::current_time)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the audio clock is currently frozen.
    pub fn is_suspended(&self) -> bool {
        self.context.as_ref().is_some_and(|c| c.suspended)
    }

    // ── Triggers ───────────────────────────────────────────

    /// Why a trigger would be dropped right now, or the clock to schedule
    /// against.
    fn ready(&self) -> Result<(f64, f64), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        let context = self.context.as_ref().ok_or(EngineError::NotInitialized)?;
        if self.muted {
            return Err(EngineError::Muted);
        }
        Ok((context.sample_rate, context.current_time()))
    }

    fn trigger(&mut self, what: &'static str, build: impl FnOnce(&mut Self, f64, f64) -> Vec<Voice>) {
        let (sample_rate, now) = match self.ready() {
            Ok(clock) => clock,
            Err(err) => {
                trace!("{what} dropped: {err}");
                return;
            }
        };
        let voices = build(self, sample_rate, now);
        let Some(context) = self.context.as_mut() else {
            return;
        };
        for voice in voices {
            if let Err(err) = context.voices.insert(voice) {
                trace!("{what} voice dropped: {err}");
            }
        }
    }

    pub fn play_transaction(&mut self, tx: &Transaction) {
        self.trigger("transaction", |engine, sample_rate, now| {
            let params = map_transaction(tx, &engine.settings, &engine.config.tuning);
            vec![(engine.profile.transaction)(sample_rate, &params, now)]
        });
    }

    pub fn play_erc20_transfer(&mut self, transfer: &TokenTransfer) {
        self.trigger("erc20 transfer", |engine, sample_rate, now| {
            let params = map_erc20(transfer, &engine.settings, &engine.config.tuning);
            vec![(engine.profile.erc20)(sample_rate, &params, now)]
        });
    }

    pub fn play_smart_contract(&mut self, tx: &Transaction) {
        self.trigger("contract call", |engine, sample_rate, now| {
            let params = map_contract_call(tx, &engine.config.tuning);
            vec![contract::contract_call(sample_rate, &params, &mut engine.rng, now)]
        });
    }

    pub fn play_block(&mut self, block: &Block) {
        self.trigger("block", |engine, sample_rate, now| {
            block::block(sample_rate, engine.settings.block_bass, block.transaction_count(), now)
        });
    }

    pub fn play_pending_transaction(&mut self, tx: &Transaction) {
        self.trigger("pending transaction", |engine, sample_rate, now| {
            trace!("pending shimmer for {}", tx.hash.as_deref().unwrap_or("unknown hash"));
            vec![ambient::pending(sample_rate, &mut engine.rng, now)]
        });
    }

    pub fn play_new_address(&mut self, address: &str) {
        self.trigger("new address", |_, sample_rate, now| {
            vec![ambient::new_address(sample_rate, address, now)]
        });
    }

    pub fn play_new_transaction(&mut self) {
        self.trigger("new transaction", |engine, sample_rate, now| {
            vec![ambient::new_transaction(sample_rate, &mut engine.rng, now)]
        });
    }

    /// Route a classified event to its trigger.
    pub fn play_event(&mut self, event: &ChainEvent) {
        match event {
            ChainEvent::Transaction(tx) => self.play_transaction(tx),
            ChainEvent::ContractCall(tx) => self.play_smart_contract(tx),
            ChainEvent::TokenTransfer(transfer) => self.play_erc20_transfer(transfer),
        }
    }

    // ── Pacing ─────────────────────────────────────────────

    /// Play the block voice now and queue a sample of its transactions to be
    /// spread over the block interval.
    pub fn enqueue_block(&mut self, block: &Block) {
        self.play_block(block);
        let Some(now) = self.context.as_ref().map(AudioContext::current_time) else {
            trace!("block dropped: {}", EngineError::NotInitialized);
            return;
        };
        let events = sample_block(block, self.config.max_transactions_per_block);
        debug!(
            "block with {} transactions, {} queued",
            block.transaction_count(),
            events.len()
        );
        self.pacer.enqueue(events, now);
    }

    pub fn enqueue_transfer(&mut self, transfer: TokenTransfer) {
        let Some(now) = self.context.as_ref().map(AudioContext::current_time) else {
            trace!("transfer dropped: {}", EngineError::NotInitialized);
            return;
        };
        self.pacer.enqueue(vec![ChainEvent::TokenTransfer(transfer)], now);
    }

    /// Events queued but not yet played.
    pub fn pending_events(&self) -> usize {
        self.pacer.pending()
    }

    // ── Frame loop ─────────────────────────────────────────

    /// Poll from the host frame loop: fire a due sequencer step and release
    /// due paced events. Skipped entirely before `init()`.
    pub fn tick(&mut self) {
        let Some(now) = self.context.as_ref().map(AudioContext::current_time) else {
            return;
        };
        if let Some(fired) = self.sequencer.tick(now) {
            let hits = (self.profile.pattern)(fired.step);
            if !hits.is_empty() {
                self.trigger("percussion", |engine, sample_rate, now| {
                    hits.into_iter()
                        .map(|hit| percussion::hit(sample_rate, &mut engine.rng, hit, now))
                        .collect()
                });
            }
        }
        for (_, event) in self.pacer.drain_due(now) {
            self.play_event(&event);
        }
    }

    /// Render interleaved stereo into `out`. Writes silence, without moving
    /// the clock, while uninitialized or suspended.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let Some(context) = self.context.as_mut() else {
            return;
        };
        if context.suspended {
            return;
        }
        for frame in out.chunks_exact_mut(2) {
            let time = context.current_time();
            let buses = context.voices.process(time);
            let (left, right) = context.graph.process(time, &buses);
            frame[0] = left;
            frame[1] = right;
            context.frame += 1;
        }
        let now = context.current_time();
        let swept = context.voices.sweep(now);
        if swept > 0 {
            trace!("swept {swept} finished voices at {now:.3}s");
        }
        context.graph.prune(now);
    }

    // ── Settings / mute / pause ────────────────────────────

    /// Merge `patch` into the live settings and glide the affected graph
    /// parameters to their new values.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        let previous_style = self.settings.sound_style;
        self.settings.apply(patch);

        if self.settings.sound_style != previous_style {
            self.profile = style::profile(self.settings.sound_style);
            debug!(
                "sound style {} -> {}",
                previous_style.name(),
                self.settings.sound_style.name()
            );
        }
        if patch.transaction_pitch.is_some() {
            self.sequencer.set_bpm(self.settings.tempo_bpm());
        }

        let muted = self.muted;
        let settings = self.settings.clone();
        let Some(context) = self.context.as_mut() else {
            return;
        };
        let now = context.current_time();
        let graph = &mut context.graph;
        if patch.master_volume.is_some() && !muted {
            graph.ramp(GraphParam::MasterGain, settings.master_gain(), now);
        }
        if patch.reverb_amount.is_some() {
            graph.ramp(GraphParam::ReverbGain, settings.reverb_amount, now);
            graph.ramp(GraphParam::DryGain, 1.0 - settings.reverb_amount, now);
        }
        if patch.filter_cutoff.is_some() {
            graph.ramp(GraphParam::FilterCutoff, settings.filter_cutoff, now);
        }
        if patch.filter_resonance.is_some() {
            graph.ramp(GraphParam::FilterResonance, settings.filter_resonance, now);
        }
        if patch.delay_time.is_some() {
            graph.ramp(GraphParam::DelayTime, settings.delay_time, now);
        }
        if patch.delay_feedback.is_some() {
            graph.ramp(GraphParam::DelayFeedback, settings.delay_feedback, now);
        }
        debug!("settings applied at {now:.3}s: {settings:?}");
    }

    /// Fade the master out and gate every trigger. The sequencer keeps
    /// counting.
    pub fn mute(&mut self) {
        self.muted = true;
        if let Some(context) = self.context.as_mut() {
            let now = context.current_time();
            context.graph.ramp(GraphParam::MasterGain, 0.0, now);
        }
    }

    pub fn unmute(&mut self) {
        self.muted = false;
        let gain = self.settings.master_gain();
        if let Some(context) = self.context.as_mut() {
            let now = context.current_time();
            context.graph.ramp(GraphParam::MasterGain, gain, now);
        }
    }

    /// Suspend the audio clock.
    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(context) = self.context.as_mut() {
            context.suspended = true;
        }
    }

    pub fn unpause(&mut self) {
        self.paused = false;
        if let Some(context) = self.context.as_mut() {
            context.suspended = false;
        }
    }

    /// Restart a suspended clock without touching the paused flag.
    pub fn resume(&mut self) {
        if let Some(context) = self.context.as_mut().filter(|c| c.suspended) {
            context.suspended = false;
        }
    }

    // ── Introspection ──────────────────────────────────────

    /// Node-equivalent count of every live voice.
    pub fn node_count(&self) -> usize {
        self.context.as_ref().map_or(0, |c| c.voices.node_count())
    }

    pub fn active_voice_count(&self) -> usize {
        self.context.as_ref().map_or(0, |c| c.voices.len())
    }

    pub fn voices(&self) -> impl Iterator<Item = (VoiceId, &Voice)> {
        self.context.iter().flat_map(|c| c.voices.iter())
    }

    /// The step the sequencer fires next.
    pub fn sequencer_step(&self) -> usize {
        self.sequencer.step()
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.sequencer.bpm()
    }

    /// Current value of a live graph parameter, once initialized.
    pub fn parameter(&self, param: GraphParam) -> Option<f64> {
        self.context
            .as_ref()
            .map(|c| c.graph.value(param, c.current_time()))
    }
}

impl Default for SonificationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BlockTransaction;
    use crate::settings::{SoundStyle, VoicePolicy};

    const SR: f64 = 8000.0;

    fn engine() -> SonificationEngine {
        let mut engine = SonificationEngine::new(EngineConfig::with_sample_rate(SR));
        engine.init().unwrap();
        engine
    }

    fn tx(value: &str) -> Transaction {
        Transaction {
            hash: Some("0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060".into()),
            from: Some("0x742d35cc6634c0532925a3b844bc454e4438f44e".into()),
            to: Some("0xdac17f958d2ee523a2206206994597c13d831ec7".into()),
            value: Some(value.into()),
            gas_price: Some("0x4a817c800".into()),
            calldata: None,
        }
    }

    fn contract_tx() -> Transaction {
        Transaction {
            calldata: Some("0xa9059cbb000000000000000000000000".into()),
            ..tx("0x0")
        }
    }

    fn transfer() -> TokenTransfer {
        TokenTransfer {
            value: Some("5000000000000000000".into()),
            transaction_hash: Some("0xfeed".into()),
            ..TokenTransfer::default()
        }
    }

    fn block_of(n: usize) -> Block {
        Block {
            transactions: (0..n).map(|_| BlockTransaction::Full(tx("0xde0b6b3a7640000"))).collect(),
            ..Block::default()
        }
    }

    fn render_seconds(engine: &mut SonificationEngine, seconds: f64) -> Vec<f32> {
        let mut out = vec![0.0; (seconds * SR) as usize * 2];
        for chunk in out.chunks_mut(256) {
            engine.render(chunk);
        }
        out
    }

    #[test]
    fn triggers_before_init_are_dropped() {
        let mut engine = SonificationEngine::new(EngineConfig::with_sample_rate(SR));
        engine.play_transaction(&tx("0x1"));
        engine.play_new_transaction();
        engine.tick();
        assert_eq!(engine.node_count(), 0);
        assert_eq!(engine.current_time(), 0.0);
        assert_eq!(engine.sequencer_step(), 0, "tick is skipped without a clock");
    }

    #[test]
    fn init_is_idempotent_and_validates() {
        let mut engine = engine();
        render_seconds(&mut engine, 0.1);
        let t = engine.current_time();
        engine.init().unwrap();
        assert_eq!(engine.current_time(), t, "second init keeps the context");

        let mut bad = SonificationEngine::new(EngineConfig::with_sample_rate(0.0));
        assert!(matches!(bad.init(), Err(EngineError::InvalidSampleRate(_))));
        assert!(!bad.is_initialized());
    }

    #[test]
    fn closed_engine_stays_closed() {
        let mut engine = engine();
        engine.close();
        assert!(matches!(engine.init(), Err(EngineError::Closed)));
        engine.play_transaction(&tx("0x1"));
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn every_style_sounds_every_event_kind() {
        for style in SoundStyle::ALL {
            let mut engine = engine();
            engine.update_settings(&SettingsPatch {
                sound_style: Some(style),
                ..SettingsPatch::default()
            });

            let mut last = engine.node_count();
            let mut played = |engine: &mut SonificationEngine, what: &str| {
                let now = engine.node_count();
                assert!(now > last, "{} {what} produced no nodes", style.name());
                last = now;
            };
            engine.play_transaction(&tx("0xde0b6b3a7640000"));
            played(&mut engine, "transaction");
            engine.play_erc20_transfer(&transfer());
            played(&mut engine, "erc20");
            engine.play_smart_contract(&contract_tx());
            played(&mut engine, "contract");
            engine.play_block(&block_of(3));
            played(&mut engine, "block");
        }
    }

    #[test]
    fn ambient_cues_schedule_voices() {
        let mut engine = engine();
        engine.play_pending_transaction(&tx("0x0"));
        engine.play_new_address("0x742d35cc6634c0532925a3b844bc454e4438f44e");
        engine.play_new_transaction();
        assert_eq!(engine.active_voice_count(), 3);
    }

    #[test]
    fn mute_gates_triggers_but_not_the_sequencer() {
        let mut engine = engine();
        engine.mute();
        let nodes = engine.node_count();
        engine.play_transaction(&tx("0xde0b6b3a7640000"));
        engine.play_block(&block_of(2));
        engine.play_new_address("0xabc");
        assert_eq!(engine.node_count(), nodes, "muted triggers add nothing");

        let step = engine.sequencer_step();
        engine.tick();
        assert_eq!(engine.sequencer_step(), (step + 1) % 16);
        assert_eq!(engine.node_count(), nodes, "muted steps are silent");

        render_seconds(&mut engine, 0.2);
        assert_eq!(engine.parameter(GraphParam::MasterGain), Some(0.0));

        engine.unmute();
        engine.play_transaction(&tx("0x1"));
        assert!(engine.node_count() > nodes);
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut engine = engine();
        render_seconds(&mut engine, 0.05);
        engine.pause();
        let frozen = engine.current_time();
        let out = render_seconds(&mut engine, 0.05);
        assert_eq!(engine.current_time(), frozen);
        assert!(out.iter().all(|&s| s == 0.0), "suspended context renders silence");
        assert!(engine.is_suspended());

        engine.unpause();
        render_seconds(&mut engine, 0.05);
        assert!(engine.current_time() > frozen);
    }

    #[test]
    fn resume_only_restarts_a_suspended_clock() {
        let mut engine = engine();
        engine.pause();
        engine.resume();
        assert!(!engine.is_suspended());
        assert!(engine.is_paused(), "resume leaves the paused flag alone");
        engine.resume();
        assert!(!engine.is_suspended());
    }

    #[test]
    fn voices_are_swept_after_they_finish() {
        let mut engine = engine();
        engine.play_transaction(&tx("0xde0b6b3a7640000"));
        engine.play_erc20_transfer(&transfer());
        assert_eq!(engine.active_voice_count(), 2);
        let out = render_seconds(&mut engine, 5.0);
        assert!(out.iter().any(|&s| s != 0.0), "voices were audible");
        assert_eq!(engine.active_voice_count(), 0);
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn voice_limit_policies() {
        let mut config = EngineConfig::with_sample_rate(SR);
        config.max_voices = 2;
        config.voice_policy = VoicePolicy::DropNew;
        let mut engine = SonificationEngine::new(config.clone());
        engine.init().unwrap();
        for _ in 0..3 {
            engine.play_new_transaction();
        }
        assert_eq!(engine.active_voice_count(), 2);
        let ids: Vec<u64> = engine.voices().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![0, 1], "the third trigger was rejected");

        config.voice_policy = VoicePolicy::DropOldest;
        let mut engine = SonificationEngine::new(config);
        engine.init().unwrap();
        for _ in 0..3 {
            engine.play_new_transaction();
        }
        assert_eq!(engine.active_voice_count(), 2);
        assert!(engine.voices().any(|(id, _)| id.0 == 2), "newest voice kept");
    }

    #[test]
    fn settings_ramp_live_parameters() {
        let mut engine = engine();
        engine.update_settings(&SettingsPatch {
            master_volume: Some(100.0),
            reverb_amount: Some(0.8),
            filter_cutoff: Some(500.0),
            delay_feedback: Some(0.2),
            ..SettingsPatch::default()
        });
        assert_eq!(engine.parameter(GraphParam::MasterGain), Some(0.5), "ramp starts at the old value");
        render_seconds(&mut engine, 0.15);
        let close = |p: GraphParam, want: f64| {
            let got = engine.parameter(p).unwrap();
            assert!((got - want).abs() < 1e-9, "{p:?}: {got} != {want}");
        };
        close(GraphParam::MasterGain, 1.0);
        close(GraphParam::ReverbGain, 0.8);
        close(GraphParam::DryGain, 0.2);
        close(GraphParam::FilterCutoff, 500.0);
        close(GraphParam::DelayFeedback, 0.2);
        close(GraphParam::DelayTime, 0.375);
    }

    #[test]
    fn settings_before_init_seed_the_graph() {
        let mut engine = SonificationEngine::new(EngineConfig::with_sample_rate(SR));
        engine.update_settings(&SettingsPatch {
            master_volume: Some(20.0),
            ..SettingsPatch::default()
        });
        engine.init().unwrap();
        assert_eq!(engine.parameter(GraphParam::MasterGain), Some(0.2));
    }

    #[test]
    fn transaction_pitch_retunes_the_sequencer() {
        let mut engine = engine();
        assert_eq!(engine.tempo_bpm(), 130.0);
        engine.update_settings(&SettingsPatch {
            transaction_pitch: Some(1000.0),
            ..SettingsPatch::default()
        });
        assert_eq!(engine.tempo_bpm(), 160.0);
    }

    #[test]
    fn sequencer_plays_the_style_pattern() {
        let mut engine = engine();
        // Minimal step 0 is a kick.
        engine.tick();
        assert_eq!(engine.active_voice_count(), 1);
        assert_eq!(engine.voices().next().map(|(_, v)| v.label), Some("kick"));
        // Step 1 is not due until a sixteenth later.
        engine.tick();
        assert_eq!(engine.sequencer_step(), 1);
    }

    #[test]
    fn enqueued_block_is_paced() {
        let mut engine = engine();
        let mut block = block_of(25);
        block.transactions.push(BlockTransaction::Full(contract_tx()));
        engine.enqueue_block(&block);
        assert_eq!(engine.active_voice_count(), 2, "block voice plays at once");
        assert_eq!(engine.pending_events(), 10);

        engine.mute();
        engine.tick();
        assert_eq!(engine.pending_events(), 9, "first event fires immediately");
        engine.unmute();

        // 12 s block time over 10 events: one every 1.2 s.
        render_seconds(&mut engine, 1.25);
        let before = engine.active_voice_count();
        engine.tick();
        assert_eq!(engine.pending_events(), 8);
        assert!(engine.active_voice_count() > before);
    }

    #[test]
    fn transfers_before_init_are_dropped() {
        let mut engine = SonificationEngine::new(EngineConfig::with_sample_rate(SR));
        engine.enqueue_transfer(transfer());
        assert_eq!(engine.pending_events(), 0);
        engine.init().unwrap();
        engine.enqueue_transfer(transfer());
        assert_eq!(engine.pending_events(), 1);
        engine.tick();
        assert_eq!(engine.pending_events(), 0);
    }

    #[test]
    fn play_event_dispatches_by_kind() {
        let mut engine = engine();
        engine.play_event(&ChainEvent::from_transaction(contract_tx()));
        let voice = engine.voices().next().map(|(_, v)| v.label);
        assert_eq!(voice, Some("contract call"));
    }
}
