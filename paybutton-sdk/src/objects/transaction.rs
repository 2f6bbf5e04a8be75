use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coins::TOKEN_PROTOCOL;

/// Transaction parameters handed to the injected wallet provider.
///
/// The base payload is `{to, from, value}`. The token transfer and auxiliary
/// data extensions are independent of each other and both may be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub to: String,
    pub from: String,
    /// Satoshis for native transfers, absolute token amount for token
    /// transfers.
    #[serde(with = "super::json_number")]
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_token_data: Option<SendTokenData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_return: Option<OpReturn>,
}

impl TransactionPayload {
    pub fn new(to: impl Into<String>, from: impl Into<String>, value: Decimal) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            value,
            send_token_data: None,
            op_return: None,
        }
    }

    /// Attach the token transfer extension.
    pub fn with_token(mut self, token_id: impl Into<String>) -> Self {
        self.send_token_data = Some(SendTokenData::new(token_id));
        self
    }

    /// Attach the auxiliary data extension. An empty sequence is ignored.
    pub fn with_op_return(mut self, data: Vec<String>) -> Self {
        if !data.is_empty() {
            self.op_return = Some(OpReturn { data });
        }
        self
    }
}

/// Token transfer extension of a [`TransactionPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenData {
    pub token_id: String,
    pub token_protocol: CompactString,
}

impl SendTokenData {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            token_protocol: CompactString::const_new(TOKEN_PROTOCOL),
        }
    }
}

/// Auxiliary data segments, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpReturn {
    pub data: Vec<String>,
}

/// What the provider returns after broadcasting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxReceipt {
    pub txid: String,
}

impl TxReceipt {
    pub fn new(txid: impl Into<String>) -> Self {
        Self { txid: txid.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_base_payload_serialization() {
        let payload = TransactionPayload::new("bitcoincash:qrecv", "bitcoincash:qsend", Decimal::from(100_000_000u64));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "to": "bitcoincash:qrecv",
                "from": "bitcoincash:qsend",
                "value": 100000000
            })
        );
    }

    #[test]
    fn test_token_and_op_return_extensions_coexist() {
        let payload = TransactionPayload::new("simpleledger:qrecv", "simpleledger:qsend", Decimal::from_str("2.5").unwrap())
            .with_token("a1b2")
            .with_op_return(vec!["6d02".to_owned(), "hello".to_owned()]);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "to": "simpleledger:qrecv",
                "from": "simpleledger:qsend",
                "value": 2.5,
                "sendTokenData": { "tokenId": "a1b2", "tokenProtocol": "slp" },
                "opReturn": { "data": ["6d02", "hello"] }
            })
        );
    }

    #[test]
    fn test_empty_op_return_is_dropped() {
        let payload = TransactionPayload::new("a", "b", Decimal::ONE).with_op_return(Vec::new());
        assert_eq!(payload.op_return, None);
    }

    #[test]
    fn test_receipt_is_a_bare_txid() {
        let receipt: TxReceipt = serde_json::from_str("\"deadbeef\"").unwrap();
        assert_eq!(receipt, TxReceipt::new("deadbeef"));
    }
}
