pub mod chain;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod pacing;
pub mod sequencer;
pub mod settings;
pub mod style;
pub mod voices;

use log::warn;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::chain::{Block, ChainEvent, TokenTransfer, Transaction};
use crate::engine::SonificationEngine;
use crate::error::EngineError;
use crate::settings::{EngineConfig, EngineSettings, SettingsPatch};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the chain_sonifier version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse one tagged chain event (`{"kind": "transaction", ...}`) from JSON.
pub fn parse_event(json: &str) -> Result<ChainEvent, EngineError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a block as returned by `eth_getBlockByNumber`.
pub fn parse_block(json: &str) -> Result<Block, EngineError> {
    Ok(serde_json::from_str(json)?)
}

/// Host payloads are best effort: anything malformed is logged and dropped.
fn from_js<T: DeserializeOwned>(what: &str, value: JsValue) -> Option<T> {
    match serde_wasm_bindgen::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring malformed {what}: {err}");
            None
        }
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed: map a transaction to its audio parameters under the given
/// settings (defaults when `settings` is undefined).
#[wasm_bindgen(js_name = mapTransaction)]
pub fn map_transaction_js(tx: JsValue, settings: JsValue) -> Result<JsValue, JsValue> {
    let tx: Transaction = serde_wasm_bindgen::from_value(tx).map_err(to_js_error)?;
    let mut live = EngineSettings::default();
    if !settings.is_undefined() && !settings.is_null() {
        let patch: SettingsPatch = serde_wasm_bindgen::from_value(settings).map_err(to_js_error)?;
        live.apply(&patch);
    }
    let params = mapper::map_transaction(&tx, &live, &EngineConfig::default().tuning);
    serde_wasm_bindgen::to_value(&params).map_err(to_js_error)
}

#[derive(Debug, Deserialize)]
struct TimedEvent {
    time: f64,
    event: ChainEvent,
}

/// WASM-exposed: render `[{time, event}, ...]` offline to WAV bytes.
#[wasm_bindgen(js_name = renderSessionWav)]
pub fn render_session_wav(events: JsValue, seconds: f64, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let events: Vec<TimedEvent> = serde_wasm_bindgen::from_value(events).map_err(to_js_error)?;
    let events: Vec<(f64, ChainEvent)> = events.into_iter().map(|e| (e.time, e.event)).collect();
    let config = EngineConfig::with_sample_rate(sample_rate as f64);
    dsp::renderer::render_session_wav(&config, &SettingsPatch::default(), &events, seconds).map_err(to_js_error)
}

/// WASM-exposed engine handle for AudioWorklet hosts.
#[wasm_bindgen]
pub struct WasmEngine {
    inner: SonificationEngine,
}

#[wasm_bindgen]
impl WasmEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> WasmEngine {
        WasmEngine {
            inner: SonificationEngine::new(EngineConfig::with_sample_rate(sample_rate)),
        }
    }

    /// Build from a JSON-shaped `EngineConfig`; missing keys take defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmEngine, JsValue> {
        let config: EngineConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        Ok(WasmEngine {
            inner: SonificationEngine::new(config),
        })
    }

    pub fn init(&mut self) -> Result<(), JsValue> {
        self.inner.init().map_err(to_js_error)
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    #[wasm_bindgen(js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    #[wasm_bindgen(js_name = playTransaction)]
    pub fn play_transaction(&mut self, tx: JsValue) {
        if let Some(tx) = from_js::<Transaction>("transaction", tx) {
            self.inner.play_transaction(&tx);
        }
    }

    #[wasm_bindgen(js_name = playErc20Transfer)]
    pub fn play_erc20_transfer(&mut self, transfer: JsValue) {
        if let Some(transfer) = from_js::<TokenTransfer>("ERC-20 transfer", transfer) {
            self.inner.play_erc20_transfer(&transfer);
        }
    }

    #[wasm_bindgen(js_name = playSmartContract)]
    pub fn play_smart_contract(&mut self, tx: JsValue) {
        if let Some(tx) = from_js::<Transaction>("contract call", tx) {
            self.inner.play_smart_contract(&tx);
        }
    }

    #[wasm_bindgen(js_name = playBlock)]
    pub fn play_block(&mut self, block: JsValue) {
        if let Some(block) = from_js::<Block>("block", block) {
            self.inner.play_block(&block);
        }
    }

    #[wasm_bindgen(js_name = playPendingTransaction)]
    pub fn play_pending_transaction(&mut self, tx: JsValue) {
        if let Some(tx) = from_js::<Transaction>("pending transaction", tx) {
            self.inner.play_pending_transaction(&tx);
        }
    }

    #[wasm_bindgen(js_name = playNewAddress)]
    pub fn play_new_address(&mut self, address: &str) {
        self.inner.play_new_address(address);
    }

    #[wasm_bindgen(js_name = playNewTransaction)]
    pub fn play_new_transaction(&mut self) {
        self.inner.play_new_transaction();
    }

    #[wasm_bindgen(js_name = enqueueBlock)]
    pub fn enqueue_block(&mut self, block: JsValue) {
        if let Some(block) = from_js::<Block>("block", block) {
            self.inner.enqueue_block(&block);
        }
    }

    #[wasm_bindgen(js_name = enqueueTransfer)]
    pub fn enqueue_transfer(&mut self, transfer: JsValue) {
        if let Some(transfer) = from_js::<TokenTransfer>("ERC-20 transfer", transfer) {
            self.inner.enqueue_transfer(transfer);
        }
    }

    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&mut self, partial: JsValue) {
        if let Some(patch) = from_js::<SettingsPatch>("settings", partial) {
            self.inner.update_settings(&patch);
        }
    }

    pub fn mute(&mut self) {
        self.inner.mute();
    }

    pub fn unmute(&mut self) {
        self.inner.unmute();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn unpause(&mut self) {
        self.inner.unpause();
    }

    pub fn resume(&mut self) {
        self.inner.resume();
    }

    /// Poll from `requestAnimationFrame`.
    pub fn tick(&mut self) {
        self.inner.tick();
    }

    /// Render `frames` interleaved stereo frames.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames * 2];
        self.inner.render(&mut out);
        out
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    #[wasm_bindgen(js_name = sequencerStep)]
    pub fn sequencer_step(&self) -> usize {
        self.inner.sequencer_step()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn parses_tagged_events() {
        let event = parse_event(
            r#"{"kind": "contractCall", "to": "0xdac1", "input": "0xa9059cbb", "value": "0x0"}"#,
        )
        .unwrap();
        let ChainEvent::ContractCall(tx) = event else {
            panic!("expected a contract call");
        };
        assert_eq!(tx.function_selector(), "0xa9059cbb");

        let transfer = parse_event(r#"{"kind": "tokenTransfer", "value": "5000000000000000000"}"#).unwrap();
        assert!(matches!(transfer, ChainEvent::TokenTransfer(_)));
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(matches!(parse_event("{\"kind\": \"nope\"}"), Err(EngineError::InvalidPayload(_))));
        assert!(parse_block("42").is_err());
    }

    #[test]
    fn parses_mixed_blocks() {
        let block = parse_block(
            r#"{"number": "0x10", "transactions": ["0xabc", {"hash": "0xdef", "value": "0x1"}]}"#,
        )
        .unwrap();
        assert_eq!(block.transaction_count(), 2);
        assert_eq!(block.full_transactions().len(), 1);
    }
}
