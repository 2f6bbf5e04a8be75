//! BIP21-style payment URIs, as encoded into the QR button.
//!
//! Only plain native-coin payments round-trip through this format; token
//! transfers and auxiliary data have no URI representation.

use rust_decimal::Decimal;

/// URI scheme of native-coin payment requests.
pub const URI_SCHEME: &str = "bitcoincash";

/// Build `bitcoincash:<address>?amount=<coins>` from an amount in satoshis.
///
/// The amount parameter is omitted when `satoshis` is `None` or cannot be
/// represented. An address that already carries the scheme prefix is used
/// as-is.
pub fn payment_uri(address: &str, satoshis: Option<u64>) -> String {
    let has_scheme = address
        .strip_prefix(URI_SCHEME)
        .is_some_and(|rest| rest.starts_with(':'));
    let mut uri = if has_scheme {
        address.to_owned()
    } else {
        format!("{URI_SCHEME}:{address}")
    };

    if let Some(coins) = satoshis.and_then(satoshis_to_coins) {
        let amount = coins.to_string();
        uri.push_str("?amount=");
        uri.push_str(&urlencoding::encode(&amount));
    }

    uri
}

fn satoshis_to_coins(satoshis: u64) -> Option<Decimal> {
    let satoshis = i64::try_from(satoshis).ok()?;
    Some(Decimal::new(satoshis, 8).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_uri_with_amount() {
        assert_eq!(
            payment_uri("qz2708636snqhsxu8wnlka78h6fdp77ar59jrf5035", Some(100_000_000)),
            "bitcoincash:qz2708636snqhsxu8wnlka78h6fdp77ar59jrf5035?amount=1"
        );
        assert_eq!(
            payment_uri("bitcoincash:qz2708636snqhsxu8wnlka78h6fdp77ar59jrf5035", Some(1_550)),
            "bitcoincash:qz2708636snqhsxu8wnlka78h6fdp77ar59jrf5035?amount=0.0000155"
        );
    }

    #[test]
    fn test_payment_uri_without_amount() {
        assert_eq!(payment_uri("qabc", None), "bitcoincash:qabc");
        assert_eq!(payment_uri("qabc", Some(u64::MAX)), "bitcoincash:qabc");
    }
}
