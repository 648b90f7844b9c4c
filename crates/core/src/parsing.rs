use crate::models::Amount;
use crate::{AMOUNT_PARAM, INBOUND_INTENT_PARAM};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Reasons an intent yields no amount. Callers on the edit path swallow these.
#[derive(Debug, Error, PartialEq)]
pub enum IntentParseError {
    #[error("intent is not a URI: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("intent has no `am` parameter")]
    MissingAmount,
    #[error("`am` parameter is not a number: {0}")]
    InvalidAmount(String),
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Extract the `am` query parameter of an intent URI as a finite number.
pub fn parse_amount(intent: &str) -> Result<Amount, IntentParseError> {
    let url = Url::parse(intent)?;
    let raw = query_param(&url, AMOUNT_PARAM)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(IntentParseError::MissingAmount)?;
    raw.parse::<f64>()
        .ok()
        .and_then(Amount::new)
        .ok_or(IntentParseError::InvalidAmount(raw))
}

/// Read the shared intent from a page URL's `s` parameter.
pub fn inbound_intent(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    query_param(&url, INBOUND_INTENT_PARAM).filter(|s| !s.trim().is_empty())
}

/// Resolve a launch argument into an intent.
///
/// A URL carrying an `s` parameter yields that parameter; anything else that
/// is not blank is taken as the intent itself.
pub fn resolve_inbound(arg: &str) -> Option<String> {
    if let Some(intent) = inbound_intent(arg) {
        return Some(intent);
    }
    let trimmed = arg.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Short SHA-256 digest used to refer to an intent in logs without leaking it.
pub fn intent_fingerprint(intent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(intent.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(16);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_from_upi_intent() {
        let amount = parse_amount("upi://pay?pa=merchant@bank&am=250.00").unwrap();
        assert_eq!(amount.value(), 250.0);
    }

    #[test]
    fn amount_is_percent_decoded() {
        let amount = parse_amount("upi://pay?pa=a@b&am=%2012.5").unwrap();
        assert_eq!(amount.value(), 12.5);
    }

    #[test]
    fn first_amount_wins() {
        let amount = parse_amount("upi://pay?am=1&am=2").unwrap();
        assert_eq!(amount.value(), 1.0);
    }

    #[test]
    fn amount_errors() {
        assert!(matches!(
            parse_amount("not a uri"),
            Err(IntentParseError::InvalidUri(_))
        ));
        assert_eq!(
            parse_amount("upi://pay?pa=merchant@bank"),
            Err(IntentParseError::MissingAmount)
        );
        assert_eq!(
            parse_amount("upi://pay?am="),
            Err(IntentParseError::MissingAmount)
        );
        assert_eq!(
            parse_amount("upi://pay?am=ten"),
            Err(IntentParseError::InvalidAmount("ten".to_string()))
        );
        assert_eq!(
            parse_amount("upi://pay?am=NaN"),
            Err(IntentParseError::InvalidAmount("NaN".to_string()))
        );
    }

    #[test]
    fn inbound_intent_is_decoded() {
        let page = "https://itqr.app/?s=upi%3A%2F%2Fpay%3Fpa%3Dmerchant%40bank%26am%3D250.00";
        assert_eq!(
            inbound_intent(page).as_deref(),
            Some("upi://pay?pa=merchant@bank&am=250.00")
        );
        assert_eq!(inbound_intent("https://itqr.app/"), None);
        assert_eq!(inbound_intent("https://itqr.app/?s="), None);
    }

    #[test]
    fn resolve_inbound_accepts_raw_intent() {
        assert_eq!(
            resolve_inbound("  upi://pay?pa=a@b  ").as_deref(),
            Some("upi://pay?pa=a@b")
        );
        assert_eq!(
            resolve_inbound("itqr://open?s=upi%3A%2F%2Fpay").as_deref(),
            Some("upi://pay")
        );
        assert_eq!(resolve_inbound("   "), None);
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = intent_fingerprint("upi://pay?pa=a@b");
        assert_eq!(a.len(), 16);
        assert_eq!(a, intent_fingerprint("upi://pay?pa=a@b"));
        assert_ne!(a, intent_fingerprint("upi://pay?pa=c@d"));
    }
}
