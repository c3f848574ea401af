//! Extraction of the web-app auth payload from a web-view URL.
//!
//! The URL returned by a web-view request carries a `tgWebAppData` parameter
//! whose value is percent-encoded twice: once as a URL parameter, and once
//! more around the embedded `user` JSON. The game API wants the fully
//! decoded string verbatim (login body and `Tl-Init-Data` header); we also
//! pull the user's identity fields out of it for the win signature.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;

/// Marker preceding the auth payload in a web-view URL.
const WEB_APP_DATA_PARAM: &str = "tgWebAppData=";

/// Errors produced while extracting the auth payload.
#[derive(Debug, thiserror::Error)]
pub enum WebAppError {
    /// The URL carries no `tgWebAppData` parameter at all.
    #[error("web-view URL carries no tgWebAppData parameter")]
    MissingPayload,

    /// The payload was present but could not be decoded or parsed.
    #[error("malformed web-app payload: {0}")]
    Malformed(String),
}

/// Identity fields embedded in the auth payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppUser {
    /// Telegram user id, as a decimal string.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name; empty when Telegram omits it.
    pub last_name: String,
}

/// The decoded auth payload plus the user identity it proves.
#[derive(Debug, Clone)]
pub struct WebAppData {
    /// Fully decoded auth blob, sent verbatim to the game API.
    pub init_data: String,
    /// Identity fields parsed out of the blob.
    pub user: WebAppUser,
}

/// Extract and decode the auth payload from a web-view URL.
///
/// # Errors
///
/// [`WebAppError::MissingPayload`] when the parameter is absent,
/// [`WebAppError::Malformed`] when decoding or the user parse fails. Both
/// are per-cycle failures: the caller keeps its stale credentials and
/// retries on the next cycle.
pub fn extract_init_data(web_view_url: &str) -> Result<WebAppData, WebAppError> {
    let start = web_view_url
        .find(WEB_APP_DATA_PARAM)
        .ok_or(WebAppError::MissingPayload)?
        .saturating_add(WEB_APP_DATA_PARAM.len());
    let tail = &web_view_url[start..];
    let raw = tail.split('&').next().unwrap_or(tail);
    if raw.is_empty() {
        return Err(WebAppError::MissingPayload);
    }

    let once = decode(raw)?;
    let init_data = decode(&once)?;
    let user = parse_user(&once)?;

    tracing::trace!(user_id = %user.id, "extracted web-app auth payload");

    Ok(WebAppData { init_data, user })
}

fn decode(raw: &str) -> Result<String, WebAppError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| WebAppError::Malformed(format!("invalid UTF-8 after decoding: {e}")))
}

/// Locate the user object in the once-decoded payload.
///
/// The payload is normally `key=value` pairs with a percent-encoded JSON
/// `user` value; some payloads are the bare JSON object itself. Both parse
/// through the same structured path, without fixed substring offsets.
fn parse_user(decoded_once: &str) -> Result<WebAppUser, WebAppError> {
    for pair in decoded_once.split('&') {
        if let Some((key, value)) = pair.split_once('=')
            && key == "user"
        {
            return parse_user_json(&decode(value)?);
        }
    }
    parse_user_json(decoded_once.trim())
}

#[derive(Deserialize)]
struct RawUser {
    id: Value,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

fn parse_user_json(json: &str) -> Result<WebAppUser, WebAppError> {
    let raw: RawUser = serde_json::from_str(json)
        .map_err(|e| WebAppError::Malformed(format!("user object: {e}")))?;

    let id = match raw.id {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => {
            return Err(WebAppError::Malformed(format!(
                "user id has unexpected type: {other}"
            )));
        },
    };

    Ok(WebAppUser {
        id,
        first_name: raw.first_name,
        last_name: raw.last_name,
    })
}
