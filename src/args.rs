//! Command line handling.
//!
//! The program takes at most one positional token. It is matched, in order,
//! against an SVO path, `a.b.c.d:port`, `a.b.c.d` and the resolution names.
//! A token that matches nothing leaves the configuration untouched.
//!
//! Tokens are taken as `OsString`: a path does not have to be valid UTF-8.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::sdk::{InitParameters, Resolution, DEFAULT_STREAM_PORT};

/// What the command line token asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOverride {
    SvoFile(PathBuf),
    /// `port` is `None` when the token only carried an address.
    Stream { ip: String, port: Option<u16> },
    Resolution(Resolution),
    Unrecognized(String),
}

impl InputOverride {
    pub fn apply(&self, params: &mut InitParameters) {
        match self {
            InputOverride::SvoFile(path) => params.set_from_svo_file(path.clone()),
            InputOverride::Stream { ip, port } => {
                params.set_from_stream(ip.clone(), port.unwrap_or(DEFAULT_STREAM_PORT))
            }
            InputOverride::Resolution(resolution) => params.camera_resolution = *resolution,
            InputOverride::Unrecognized(_) => {}
        }
    }

    /// Console line announcing the override, if any.
    pub fn describe(&self) -> Option<String> {
        match self {
            InputOverride::SvoFile(path) => Some(format!("Using SVO File input: {}", path.display())),
            InputOverride::Stream { ip, port: Some(port) } => {
                Some(format!("Using Stream input, IP : {}, port : {}", ip, port))
            }
            InputOverride::Stream { ip, port: None } => Some(format!("Using Stream input, IP : {}", ip)),
            InputOverride::Resolution(resolution) => {
                Some(format!("Using Camera in resolution {}", resolution))
            }
            InputOverride::Unrecognized(_) => None,
        }
    }
}

pub fn parse_input_token(token: impl AsRef<OsStr>) -> InputOverride {
    let raw = token.as_ref();
    if raw.as_encoded_bytes().windows(4).any(|w| w == b".svo") {
        return InputOverride::SvoFile(PathBuf::from(raw));
    }

    let Some(token) = raw.to_str() else {
        return InputOverride::Unrecognized(raw.to_string_lossy().into_owned());
    };

    if let Some((octets, rest)) = scan_ipv4(token) {
        if let Some(rest) = rest.strip_prefix(':') {
            // A port that does not fit is dropped, the address is kept.
            if let Some((port, _)) = take_number(rest) {
                return InputOverride::Stream {
                    ip: join_octets(octets),
                    port: u16::try_from(port).ok(),
                };
            }
        }
        // Without a port the token is passed through as-is, trailing text included.
        return InputOverride::Stream {
            ip: token.to_string(),
            port: None,
        };
    }

    match Resolution::OVERRIDES
        .iter()
        .find(|resolution| token.contains(resolution.as_str()))
    {
        Some(resolution) => InputOverride::Resolution(*resolution),
        None => InputOverride::Unrecognized(token.to_string()),
    }
}

/// Applies the first argument after the program name to `params`.
///
/// Returns the override that was found, or `None` when no argument was given.
pub fn configure_from_args<I>(args: I, params: &mut InitParameters) -> Option<InputOverride>
where
    I: IntoIterator<Item = OsString>,
{
    let token = args.into_iter().nth(1)?;
    let input = parse_input_token(&token);
    input.apply(params);

    match input.describe() {
        Some(line) => println!("[Publisher] {}", line),
        None => log::debug!("ignoring unrecognized argument {:?}", token),
    }

    Some(input)
}

/// Leading digits of `s` and the rest. Values past `u32` saturate.
fn take_number(s: &str) -> Option<(u32, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = s[..digits].parse().unwrap_or(u32::MAX);
    Some((value, &s[digits..]))
}

fn join_octets(octets: [u32; 4]) -> String {
    octets.map(|o| o.to_string()).join(".")
}

/// Four dot separated numbers at the start of `s`, plus the unparsed rest.
fn scan_ipv4(s: &str) -> Option<([u32; 4], &str)> {
    let (first, mut rest) = take_number(s)?;
    let mut octets = [first, 0, 0, 0];
    for slot in octets.iter_mut().skip(1) {
        rest = rest.strip_prefix('.')?;
        let (value, tail) = take_number(rest)?;
        *slot = value;
        rest = tail;
    }
    Some((octets, rest))
}
