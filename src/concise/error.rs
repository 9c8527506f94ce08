use crate::board::Hex;

/// Failure to resolve a map coordinate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinate {0:?} is too short")]
    TooShort(String),
    #[error("row {row:?} in {code:?} is out of range")]
    RowOutOfRange { code: String, row: char },
    #[error("ordinal in {0:?} is not a positive number")]
    BadOrdinal(String),
    #[error("{code:?} asks for hex {ordinal} but row has only {available} land hexes")]
    OrdinalOutOfRange {
        code: String,
        ordinal: usize,
        available: usize,
    },
    #[error("hex {0} is not on the map")]
    OffBoard(Hex),
    #[error("hex {0} is river and has no land coordinate")]
    River(Hex),
    #[error("river reference {0:?} must look like R~<coordinate>")]
    BadRiverReference(String),
    #[error("no river hex next to {0:?}")]
    NoAdjacentRiver(String),
}

/// Failure to decode one cell token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("unknown action code {0:?}")]
    UnknownCode(String),
    #[error("malformed {token:?}: {reason}")]
    MalformedSegment { token: String, reason: String },
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    #[error("conversion {0:?} must be chained after another action")]
    StandaloneConversion(String),
    #[error("in compound token: {0}")]
    CompoundSubError(Box<TokenError>),
}

impl TokenError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        TokenError::MalformedSegment {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// The innermost error, looking through compound wrapping
    pub fn root(&self) -> &TokenError {
        match self {
            TokenError::CompoundSubError(inner) => inner.root(),
            other => other,
        }
    }
}

/// Strict-mode parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}, column {column} ({player}): cannot decode {token:?}: {source}")]
    Token {
        line: usize,
        column: usize,
        player: String,
        token: String,
        #[source]
        source: TokenError,
    },
    #[error("line {line}: {message}")]
    Layout { line: usize, message: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Token { line, .. } | ParseError::Layout { line, .. } => *line,
        }
    }
}

/// Failure to render an item stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("item {index} ({player}): {source}")]
    Coordinate {
        index: usize,
        player: String,
        #[source]
        source: CoordinateError,
    },
    #[error("item {index} ({player}): conversion {code:?} has no earlier action of the same player to chain onto")]
    UnhostedConversion {
        index: usize,
        player: String,
        code: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("column width must be at least 1")]
    ZeroColumnWidth,
}
