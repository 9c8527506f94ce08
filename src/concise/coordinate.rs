//! Row/ordinal coordinates ("D5") to axial hexes and back.
//!
//! The letter picks the row, the number counts land hexes from the left edge
//! of that row, skipping river.
use crate::board::{BoardLayout, Hex, Terrain, BASE_BOARD};

use super::error::CoordinateError;

const RIVER_PREFIX: &str = "R~";

pub fn coordinate_to_axial(code: &str) -> Result<Hex, CoordinateError> {
    coordinate_to_axial_on(&*BASE_BOARD, code)
}

pub fn axial_to_coordinate(hex: Hex) -> Result<String, CoordinateError> {
    axial_to_coordinate_on(&*BASE_BOARD, hex)
}

pub fn river_coordinate_to_axial(code: &str) -> Result<Hex, CoordinateError> {
    river_coordinate_to_axial_on(&*BASE_BOARD, code)
}

pub fn coordinate_to_axial_on<B: BoardLayout + ?Sized>(
    board: &B,
    code: &str,
) -> Result<Hex, CoordinateError> {
    let code = code.trim().to_ascii_uppercase();
    let mut chars = code.chars();
    let row_letter = match chars.next() {
        Some(letter) if code.len() >= 2 => letter,
        _ => return Err(CoordinateError::TooShort(code)),
    };
    if !row_letter.is_ascii_uppercase() || (row_letter as i32 - 'A' as i32) >= board.row_count() {
        return Err(CoordinateError::RowOutOfRange {
            code: code.clone(),
            row: row_letter,
        });
    }
    let r = row_letter as i32 - 'A' as i32;
    let digits = chars.as_str();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoordinateError::BadOrdinal(code));
    }
    let ordinal: usize = match digits.parse() {
        Ok(ordinal) if ordinal >= 1 => ordinal,
        _ => return Err(CoordinateError::BadOrdinal(code)),
    };

    let mut available = 0;
    let mut q = board.row_start(r);
    while let Some(terrain) = board.terrain(Hex::new(q, r)) {
        if terrain != Terrain::River {
            available += 1;
            if available == ordinal {
                return Ok(Hex::new(q, r));
            }
        }
        q += 1;
    }
    Err(CoordinateError::OrdinalOutOfRange {
        code,
        ordinal,
        available,
    })
}

pub fn axial_to_coordinate_on<B: BoardLayout + ?Sized>(
    board: &B,
    hex: Hex,
) -> Result<String, CoordinateError> {
    if !board.contains(hex) {
        return Err(CoordinateError::OffBoard(hex));
    }
    if board.is_river(hex) {
        return Err(CoordinateError::River(hex));
    }
    let ordinal = (board.row_start(hex.r)..=hex.q)
        .filter(|q| !board.is_river(Hex::new(*q, hex.r)))
        .count();
    let row_letter = (b'A' + hex.r as u8) as char;
    Ok(format!("{}{}", row_letter, ordinal))
}

/// Resolves `R~<coord>` to the first river hex next to that land hex
pub fn river_coordinate_to_axial_on<B: BoardLayout + ?Sized>(
    board: &B,
    code: &str,
) -> Result<Hex, CoordinateError> {
    let upper = code.trim().to_ascii_uppercase();
    let land = upper
        .strip_prefix(RIVER_PREFIX)
        .ok_or_else(|| CoordinateError::BadRiverReference(code.to_string()))?;
    let land_hex = coordinate_to_axial_on(board, land)?;
    board
        .neighbors(land_hex)
        .into_iter()
        .find(|neighbor| board.is_river(*neighbor))
        .ok_or_else(|| CoordinateError::NoAdjacentRiver(land.to_string()))
}

/// Cheap shape check: a row letter followed by one or two digits
pub fn looks_like_coordinate(token: &str) -> bool {
    let bytes = token.as_bytes();
    (2..=3).contains(&bytes.len())
        && bytes[0].is_ascii_alphabetic()
        && bytes[1..].iter().all(u8::is_ascii_digit)
}
