//! Error types for board parsing and configuration.

use std::fmt;

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4)
    TooFewParts { found: usize },
    /// Invalid piece character in the placement field
    InvalidPiece { char: char },
    /// Lancer facing in parentheses is missing or unknown
    InvalidLancer { token: String },
    /// Invalid character in the hand section `[...]`
    InvalidHand { char: char },
    /// Invalid castling character
    InvalidCastling { char: char },
    /// Castling right refers to a square without the matching king or rook
    MissingCastlingPiece { char: char },
    /// Invalid side to move (must be 'w' or 'b')
    InvalidSideToMove { found: String },
    /// Invalid en passant square
    InvalidEnPassant { found: String },
    /// Wrong number of ranks in the placement field
    InvalidRank { rank: usize },
    /// Too many or too few files in a rank
    TooManyFiles { rank: usize, files: usize },
    /// Half-move clock or full-move number is not a number
    InvalidCounter { found: String },
    /// Eightpiece disabled-move field is malformed
    InvalidDisabledMove { found: String },
    /// Square notation error inside a field
    Square(SquareError),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 parts, found {found}")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "Invalid piece character '{char}' in FEN")
            }
            FenError::InvalidLancer { token } => {
                write!(f, "Invalid lancer direction '{token}' in FEN")
            }
            FenError::InvalidHand { char } => {
                write!(f, "Invalid hand piece '{char}' in FEN")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "Invalid castling character '{char}' in FEN")
            }
            FenError::MissingCastlingPiece { char } => {
                write!(f, "Castling right '{char}' has no matching king and rook")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "Invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "Invalid en passant square '{found}'")
            }
            FenError::InvalidRank { rank } => {
                write!(f, "Invalid rank index {rank} in FEN")
            }
            FenError::TooManyFiles { rank, files } => {
                write!(f, "Rank {rank} has {files} files, expected 8")
            }
            FenError::InvalidCounter { found } => {
                write!(f, "Invalid move counter '{found}' in FEN")
            }
            FenError::InvalidDisabledMove { found } => {
                write!(f, "Invalid disabled move '{found}' in FEN")
            }
            FenError::Square(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FenError::Square(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SquareError> for FenError {
    fn from(err: SquareError) -> Self {
        FenError::Square(err)
    }
}

/// Error type for UCI move parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string is too short or too long
    InvalidLength { len: usize },
    /// Invalid square notation in move
    InvalidSquare { notation: String },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4-8 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// Square notation must be exactly two characters
    InvalidLength { len: usize },
    /// File outside `a..=h`
    InvalidFile { char: char },
    /// Rank outside `1..=8`
    InvalidRank { char: char },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::InvalidLength { len } => {
                write!(f, "Square must be 2 characters, found {len}")
            }
            SquareError::InvalidFile { char } => {
                write!(f, "Invalid file '{char}' (must be a-h)")
            }
            SquareError::InvalidRank { char } => {
                write!(f, "Invalid rank '{char}' (must be 1-8)")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Error type for SAN parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    /// Empty SAN string
    Empty,
    /// Several legal moves match
    AmbiguousMove { san: String },
    /// No matching legal move found
    NoMatchingMove { san: String },
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "Empty SAN string"),
            SanError::AmbiguousMove { san } => write!(f, "Ambiguous move '{san}'"),
            SanError::NoMatchingMove { san } => write!(f, "No legal move matches '{san}'"),
        }
    }
}

impl std::error::Error for SanError {}

/// Unknown variant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    Unknown { name: String },
}

impl fmt::Display for VariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantError::Unknown { name } => write!(f, "Unknown variant '{name}'"),
        }
    }
}

impl std::error::Error for VariantError {}

/// Error type for `setoption`-style configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// No option with this name
    UnknownOption { name: String },
    /// Value does not parse as the option's type
    InvalidValue { name: String, value: String },
    /// Integer outside the option's range
    OutOfRange { name: String, value: i64, min: i64, max: i64 },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::UnknownOption { name } => write!(f, "Unknown option '{name}'"),
            OptionError::InvalidValue { name, value } => {
                write!(f, "Invalid value '{value}' for option '{name}'")
            }
            OptionError::OutOfRange {
                name,
                value,
                min,
                max,
            } => write!(f, "Value {value} for option '{name}' outside {min}..={max}"),
        }
    }
}

impl std::error::Error for OptionError {}

impl From<VariantError> for OptionError {
    fn from(err: VariantError) -> Self {
        match err {
            VariantError::Unknown { name } => OptionError::InvalidValue {
                name: "UCI_Variant".to_string(),
                value: name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_fen_error_too_few_parts() {
        let err = FenError::TooFewParts { found: 2 };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn test_fen_error_invalid_piece() {
        let err = FenError::InvalidPiece { char: 'z' };
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_fen_error_wraps_square_error() {
        let err: FenError = SquareError::InvalidRank { char: '9' }.into();
        assert!(err.to_string().contains('9'));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_move_error_illegal_move() {
        let err = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert!(err.to_string().contains("e2e5"));
    }

    #[test]
    fn test_square_error_messages() {
        assert!(SquareError::InvalidFile { char: 'z' }.to_string().contains("'z'"));
        assert!(SquareError::InvalidLength { len: 3 }.to_string().contains('3'));
    }

    #[test]
    fn test_san_error_no_match() {
        let err = SanError::NoMatchingMove {
            san: "Qh7".to_string(),
        };
        assert!(err.to_string().contains("Qh7"));
    }

    #[test]
    fn test_option_error_from_variant() {
        let err: OptionError = VariantError::Unknown {
            name: "crazyhouse".to_string(),
        }
        .into();
        assert!(err.to_string().contains("UCI_Variant"));
        assert!(err.to_string().contains("crazyhouse"));
    }
}
