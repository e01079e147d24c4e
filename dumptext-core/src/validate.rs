use crate::error::{Error, Result};

/// Indices of every zero byte in `data`.
pub fn null_byte_indices(data: &[u8]) -> Vec<usize> {
    data.iter()
        .enumerate()
        .filter(|&(_, &b)| b == 0)
        .map(|(i, _)| i)
        .collect()
}

/// Fails with [`Error::NullBytes`] if `data` contains any zero byte.
pub fn ensure_no_null_bytes(data: &[u8]) -> Result<()> {
    let indices = null_byte_indices(data);
    if indices.is_empty() {
        Ok(())
    } else {
        Err(Error::NullBytes(indices))
    }
}
