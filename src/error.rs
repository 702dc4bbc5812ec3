/// What was wrong with a literal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("empty literal")]
    Empty,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("expected digits")]
    MissingDigits,
    #[error("expected digits after exponent marker")]
    MissingExponentDigits,
    #[error("hexadecimal float has no 'p' exponent")]
    MissingBinaryExponent,
    #[error("digit {digit:?} out of range for base {radix}")]
    DigitOutOfRange { digit: char, radix: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed literal {literal:?} at byte {position}: {kind}")]
    MalformedLiteral {
        literal: String,
        position: usize,
        kind: LiteralError,
    },
}

impl Error {
    pub(crate) fn malformed(literal: &str, position: usize, kind: LiteralError) -> Self {
        Error::MalformedLiteral {
            literal: literal.to_string(),
            position,
            kind,
        }
    }

    /// The part of the literal from the point where parsing failed.
    pub fn offending(&self) -> &str {
        match self {
            Error::MalformedLiteral { literal, position, .. } => {
                literal.get(*position..).unwrap_or("")
            }
        }
    }

    pub fn kind(&self) -> &LiteralError {
        match self {
            Error::MalformedLiteral { kind, .. } => kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
