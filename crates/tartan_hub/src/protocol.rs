//! Wire protocol spoken between the hub and the house controller.
//!
//! Plain ASCII over TCP, one request per read:
//! - `GS...` asks for the current state, answered with `SU:<snapshot>.\n`
//! - `SS<c><KEY=value;...><c>` sets fields, answered with `OK.\n`
//!
//! The set-state payload is whatever sits between a fixed three character
//! prefix and a one character terminator; no length check is made, so a
//! short message simply carries an empty payload.

use crate::house::FieldKey;
use crate::house::HouseState;
use crate::house::split_pair;

pub const GET_STATE: &str = "GS";
pub const SET_STATE: &str = "SS";
pub const STATE_UPDATE: &str = "SU";
pub const OK: &str = "OK";
pub const MSG_DELIM: char = ':';
pub const PARAM_DELIM: char = ';';
pub const MSG_END: char = '.';

/// Characters stripped from the front of a set-state message (`SS` + one).
const SET_STATE_PREFIX_LEN: usize = 3;

/// A request received from the house controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<'a> {
    GetState,
    /// Ordered `(key, value)` pairs; later pairs overwrite earlier ones
    SetState(Vec<(&'a str, &'a str)>),
}

impl<'a> Request<'a> {
    /// Classify a request by its first two characters.
    pub fn parse(text: &'a str) -> Result<Self, ProtocolError> {
        if text.starts_with(GET_STATE) {
            Ok(Request::GetState)
        } else if text.starts_with(SET_STATE) {
            let pairs = set_state_payload(text)
                .split(PARAM_DELIM)
                .filter(|p| !p.is_empty())
                .map(split_pair)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Request::SetState(pairs))
        } else {
            Err(ProtocolError::UnknownRequest(text.to_string()))
        }
    }
}

/// The text between the set-state prefix and its terminator.
pub fn set_state_payload(text: &str) -> &str {
    if text.len() <= SET_STATE_PREFIX_LEN {
        return "";
    }
    text.get(SET_STATE_PREFIX_LEN..text.len() - 1).unwrap_or("")
}

/// A reply sent back to the house controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    StateUpdate(String),
    Ok,
}

impl Response {
    pub fn encode(&self) -> String {
        match self {
            Response::StateUpdate(snapshot) => {
                format!("{}{}{}{}\n", STATE_UPDATE, MSG_DELIM, snapshot, MSG_END)
            }
            Response::Ok => format!("{}{}\n", OK, MSG_END),
        }
    }
}

/// Build a get-state request.
pub fn encode_get_state() -> String {
    format!("{}{}", GET_STATE, MSG_END)
}

/// Build a set-state request carrying `fields` in order.
pub fn encode_set_state(fields: &[(FieldKey, bool)]) -> String {
    let delim = PARAM_DELIM.to_string();
    let payload = fields
        .iter()
        .map(|(key, on)| format!("{}={}", key, if *on { "1" } else { "0" }))
        .collect::<Vec<_>>()
        .join(delim.as_str());
    format!("{}{}{}{}", SET_STATE, MSG_DELIM, payload, MSG_END)
}

/// Parse a `SU:<snapshot>.` line sent by the hub.
pub fn parse_state_update(line: &str) -> Result<HouseState, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let body = line
        .strip_prefix(STATE_UPDATE)
        .and_then(|rest| rest.strip_prefix(MSG_DELIM))
        .and_then(|rest| rest.strip_suffix(MSG_END))
        .ok_or_else(|| ProtocolError::UnexpectedResponse(line.to_string()))?;
    HouseState::from_snapshot(body)
}

/// Check that a line is the hub's `OK.` acknowledgement.
pub fn parse_ok(line: &str) -> Result<(), ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == Response::Ok.encode().trim_end() {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedResponse(line.to_string()))
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown request: {0:?}")]
    UnknownRequest(String),

    #[error("Malformed field {0:?}, expected KEY=value")]
    MalformedField(String),

    #[error("Unknown field key: {0}")]
    UnknownField(String),

    #[error("Missing field: {0}")]
    MissingField(FieldKey),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: FieldKey, value: String },

    #[error("Unexpected response: {0:?}")]
    UnexpectedResponse(String),
}
