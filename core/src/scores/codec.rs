/// Reversible transform applied to each stored line.
pub trait LineCodec {
    fn encode(&self, line: &str) -> String;
    fn decode(&self, line: &str) -> Result<String, &'static str>;
}

/// Lines stored as they are, used for the human-readable seed file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainCodec;

impl LineCodec for PlainCodec {
    fn encode(&self, line: &str) -> String {
        line.into()
    }

    fn decode(&self, line: &str) -> Result<String, &'static str> {
        Ok(line.into())
    }
}

/// Every byte as two lowercase hex digits, so the file is not casually editable.
///
/// Not encryption. ASCII text produces the same bytes as older stores wrote.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HexCodec;

impl LineCodec for HexCodec {
    fn encode(&self, line: &str) -> String {
        hex::encode(line.as_bytes())
    }

    fn decode(&self, line: &str) -> Result<String, &'static str> {
        let bytes = hex::decode(line).map_err(hex_error_reason)?;
        String::from_utf8(bytes).map_err(|_| "not valid UTF-8")
    }
}

fn hex_error_reason(err: hex::FromHexError) -> &'static str {
    match err {
        hex::FromHexError::OddLength => "odd number of hex digits",
        hex::FromHexError::InvalidHexCharacter { .. } => "invalid hex digit",
        hex::FromHexError::InvalidStringLength => "unexpected line length",
    }
}
