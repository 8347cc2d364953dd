//! Chain events: the data handed over by the connection layer.
//!
//! Every numeric field arrives as a string (hex wei for transactions, a
//! decimal token amount for ERC-20 transfers). Parsing is lenient: anything
//! unparseable reads as zero, so a malformed event still maps to a valid,
//! minimal sound.

use serde::{Deserialize, Serialize};

/// Wei per ether (and per whole token for 18-decimal ERC-20s).
pub const WEI_PER_ETH: f64 = 1e18;

/// Wei per gwei.
pub const WEI_PER_GWEI: f64 = 1e9;

/// Selector used when a contract call carries no calldata.
pub const EMPTY_SELECTOR: &str = "0x00000000";

/// A plain transaction or contract call, as delivered by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Value in wei, usually `0x`-prefixed hex.
    #[serde(default)]
    pub value: Option<String>,
    /// Gas price in wei, usually `0x`-prefixed hex.
    #[serde(default)]
    pub gas_price: Option<String>,
    /// Call data; nodes name this field `input`.
    #[serde(default, alias = "input")]
    pub calldata: Option<String>,
}

impl Transaction {
    pub fn value_wei(&self) -> f64 {
        self.value.as_deref().map(parse_quantity).unwrap_or(0.0)
    }

    pub fn value_in_eth(&self) -> f64 {
        self.value_wei() / WEI_PER_ETH
    }

    pub fn gas_price_wei(&self) -> f64 {
        self.gas_price.as_deref().map(parse_quantity).unwrap_or(0.0)
    }

    pub fn gas_price_gwei(&self) -> f64 {
        self.gas_price_wei() / WEI_PER_GWEI
    }

    /// A transaction addressed to something, carrying calldata beyond `0x`.
    pub fn is_contract_call(&self) -> bool {
        self.to.is_some() && self.calldata.as_deref().is_some_and(|data| data.len() > 2)
    }

    /// The `0x`-prefixed 4-byte function selector (first ten characters of
    /// the calldata), or [`EMPTY_SELECTOR`] when there is none.
    pub fn function_selector(&self) -> String {
        match self.calldata.as_deref() {
            Some(data) if !data.is_empty() => data.chars().take(10).collect(),
            _ => EMPTY_SELECTOR.to_string(),
        }
    }
}

/// A decoded ERC-20 `Transfer` log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Raw amount as a decimal string, assumed 18 decimals.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl TokenTransfer {
    /// Whole-token amount.
    pub fn value_tokens(&self) -> f64 {
        self.value.as_deref().map(parse_decimal).unwrap_or(0.0) / WEI_PER_ETH
    }
}

/// Transactions inside a block are either bare hashes or full objects,
/// depending on how the block was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransaction {
    Hash(String),
    Full(Transaction),
}

/// A mined block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub number: Option<serde_json::Value>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

impl Block {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Full transaction objects, skipping bare hashes.
    pub fn full_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter_map(|tx| match tx {
                BlockTransaction::Full(tx) => Some(tx.clone()),
                BlockTransaction::Hash(_) => None,
            })
            .collect()
    }
}

/// One sonifiable chain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChainEvent {
    Transaction(Transaction),
    ContractCall(Transaction),
    TokenTransfer(TokenTransfer),
}

impl ChainEvent {
    /// Classify a raw transaction as a plain transfer or a contract call.
    pub fn from_transaction(tx: Transaction) -> Self {
        if tx.is_contract_call() {
            ChainEvent::ContractCall(tx)
        } else {
            ChainEvent::Transaction(tx)
        }
    }
}

// ── Lenient numeric parsing ────────────────────────────────

/// Parse a wei quantity: `0x`-prefixed hex, otherwise decimal. Returns 0 for
/// anything unparseable or non-finite.
pub fn parse_quantity(s: &str) -> f64 {
    let s = s.trim();
    if s.starts_with("0x") || s.starts_with("0X") {
        parse_hex(s)
    } else {
        parse_decimal(s)
    }
}

/// Parse the leading hex digits of `s` (an optional `0x` prefix is skipped)
/// into an `f64`. Arbitrarily long quantities are accepted; the result loses
/// precision past 2^53 but never overflows for realistic chain values.
pub fn parse_hex(s: &str) -> f64 {
    let digits = strip_hex_prefix(s.trim());
    let mut value = 0.0_f64;
    let mut seen = false;
    for c in digits.chars() {
        match c.to_digit(16) {
            Some(d) => {
                value = value * 16.0 + d as f64;
                seen = true;
            }
            None => break,
        }
    }
    if seen && value.is_finite() { value } else { 0.0 }
}

/// Parse a decimal number, falling back to its longest numeric prefix
/// (`"12.5abc"` → 12.5). Returns 0 when nothing numeric is found.
pub fn parse_decimal(s: &str) -> f64 {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return if v.is_finite() { v } else { 0.0 };
    }
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Integer value of the last `n` characters of `s`, read as hex.
///
/// Mirrors how hashes and addresses are used as entropy: only the trailing
/// characters matter. Returns `None` if the slice holds no leading hex digit.
pub fn hex_suffix(s: &str, n: usize) -> Option<u64> {
    let chars: Vec<char> = s.trim().chars().collect();
    let start = chars.len().saturating_sub(n);
    let tail: String = chars[start..].iter().collect();
    let digits = strip_hex_prefix(&tail);
    let mut value: u64 = 0;
    let mut seen = false;
    for c in digits.chars() {
        match c.to_digit(16) {
            Some(d) => {
                value = value.wrapping_mul(16).wrapping_add(d as u64);
                seen = true;
            }
            None => break,
        }
    }
    seen.then_some(value)
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ether_in_hex() {
        let tx = Transaction {
            value: Some("0xde0b6b3a7640000".into()),
            ..Default::default()
        };
        assert!((tx.value_in_eth() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_quantities_read_as_zero() {
        assert_eq!(parse_quantity("0xzz"), 0.0);
        assert_eq!(parse_quantity(""), 0.0);
        assert_eq!(parse_quantity("garbage"), 0.0);
        assert_eq!(parse_decimal("NaN"), 0.0);
        assert_eq!(parse_decimal("inf"), 0.0);
        let tx = Transaction::default();
        assert_eq!(tx.value_in_eth(), 0.0);
        assert_eq!(tx.gas_price_gwei(), 0.0);
    }

    #[test]
    fn hex_stops_at_first_invalid_digit() {
        assert_eq!(parse_hex("0x1fzz"), 31.0);
        assert_eq!(parse_hex("ff"), 255.0);
    }

    #[test]
    fn decimal_prefix_fallback() {
        assert_eq!(parse_decimal("5000000000000000000"), 5e18);
        assert_eq!(parse_decimal("12.5tokens"), 12.5);
    }

    #[test]
    fn gas_price_in_gwei() {
        let tx = Transaction {
            gas_price: Some("0x4a817c800".into()), // 20 gwei
            ..Default::default()
        };
        assert!((tx.gas_price_gwei() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn hash_suffix_slices_trailing_characters() {
        assert_eq!(hex_suffix("0x1234abcdef01", 8), Some(0xabcdef01));
        assert_eq!(hex_suffix("0x1234abcdef01", 2), Some(0x01));
        assert_eq!(hex_suffix("0xab", 8), Some(0xab));
        assert_eq!(hex_suffix("0x", 2), None);
        assert_eq!(hex_suffix("", 8), None);
    }

    #[test]
    fn contract_call_classification() {
        let call = Transaction {
            to: Some("0xdac17f958d2ee523a2206206994597c13d831ec7".into()),
            calldata: Some("0xa9059cbb000000".into()),
            ..Default::default()
        };
        assert!(call.is_contract_call());
        assert_eq!(call.function_selector(), "0xa9059cbb");
        assert!(matches!(ChainEvent::from_transaction(call), ChainEvent::ContractCall(_)));

        let plain = Transaction {
            to: Some("0x01".into()),
            calldata: Some("0x".into()),
            ..Default::default()
        };
        assert!(!plain.is_contract_call());
        assert_eq!(plain.function_selector(), "0x");

        let creation = Transaction {
            calldata: Some("0x6080".into()),
            ..Default::default()
        };
        assert!(!creation.is_contract_call(), "contract creation has no `to`");
        assert_eq!(Transaction::default().function_selector(), EMPTY_SELECTOR);
    }

    #[test]
    fn node_payload_deserializes() {
        let json = r#"{
            "hash": "0xabc",
            "from": "0x01",
            "to": "0x02",
            "value": "0x0",
            "gasPrice": "0x3b9aca00",
            "input": "0xa9059cbb",
            "nonce": 7
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.calldata.as_deref(), Some("0xa9059cbb"));
        assert!((tx.gas_price_gwei() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn block_with_mixed_transactions() {
        let json = r#"{
            "number": 19000000,
            "hash": "0xblock",
            "transactions": ["0xaaa", {"hash": "0xbbb", "value": "0x1"}]
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.transaction_count(), 2);
        let full = block.full_transactions();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].hash.as_deref(), Some("0xbbb"));
    }

    #[test]
    fn token_transfer_amount() {
        let transfer = TokenTransfer {
            value: Some("5000000000000000000".into()),
            ..Default::default()
        };
        assert!((transfer.value_tokens() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn tagged_event_round_trip() {
        let json = r#"{"kind": "tokenTransfer", "value": "1"}"#;
        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ChainEvent::TokenTransfer(_)));
    }
}
