use crate::error::{Result, SheetError};

/// Convert column letters to a 0-based column index
/// A=0, B=1, ... Z=25, AA=26, AB=27, ...
///
/// Letters are case-insensitive and surrounding whitespace is ignored.
pub fn column_letters_to_index(letters: &str) -> Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err(SheetError::InvalidColumnLetters(letters.to_string()));
    }

    let mut col: usize = 0;
    for b in letters.bytes() {
        let upper = b.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(SheetError::InvalidColumnLetters(letters.to_string()));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(usize::from(upper - b'A') + 1))
            .ok_or_else(|| SheetError::InvalidColumnLetters(letters.to_string()))?;
    }

    Ok(col - 1)
}

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
pub fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1;

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}
