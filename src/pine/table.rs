use crate::{
    bitstreams::BitString,
    error::{PineError, Result},
    huffman::{CodeTable, SymbolTree},
};

use super::TableLayout;

pub const SENTINEL: u8 = 0xFF;

/// Serializes the table entry by entry, in ascending symbol order.
///
/// Every entry starts with the number of zero bits that left-pad the code to a
/// whole number of bytes, followed by those bytes.
pub fn bytes_from_code_table(table: &CodeTable, layout: TableLayout) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    for (symbol, code) in table.iter() {
        let (pad, code_bytes) = code.to_padded_bytes();

        match layout {
            TableLayout::Sentinel => {
                if symbol == SENTINEL || code_bytes.contains(&SENTINEL) {
                    return Err(PineError::SentinelCollision(symbol));
                }
                out.push(pad);
                out.extend_from_slice(&code_bytes);
                out.push(symbol);
                out.push(SENTINEL);
            }
            TableLayout::LengthPrefixed => {
                let n = u8::try_from(code_bytes.len()).map_err(|_| {
                    PineError::invalid_tree(format!(
                        "code of {symbol:#04x} is {} bits long",
                        code.len()
                    ))
                })?;
                out.push(pad);
                out.push(n);
                out.extend_from_slice(&code_bytes);
                out.push(symbol);
            }
        }
    }

    Ok(out)
}

/// Inverse of [`bytes_from_code_table`].
pub fn code_table_from_bytes(bytes: &[u8], layout: TableLayout) -> Result<CodeTable> {
    let mut table = CodeTable::new();

    match layout {
        TableLayout::Sentinel => {
            let mut chunks: Vec<&[u8]> = bytes.split(|&b| b == SENTINEL).collect();
            // split leaves an empty chunk after the final sentinel
            if chunks.last().is_some_and(|c| c.is_empty()) {
                chunks.pop();
            }

            for chunk in chunks {
                // pad, at least one code byte, symbol
                if chunk.len() < 3 {
                    return Err(PineError::malformed(format!(
                        "table entry of {} bytes is too short",
                        chunk.len()
                    )));
                }
                let symbol = chunk[chunk.len() - 1];
                let code = read_code(chunk[0], &chunk[1..chunk.len() - 1])?;
                table.insert(symbol, code)?;
            }
        }
        TableLayout::LengthPrefixed => {
            let mut rest = bytes;
            while !rest.is_empty() {
                let (&pad, after_pad) = rest
                    .split_first()
                    .ok_or_else(|| PineError::malformed("missing code padding"))?;
                let (&n, after_len) = after_pad
                    .split_first()
                    .ok_or_else(|| PineError::malformed("missing code length"))?;

                let n = n as usize;
                if n == 0 || after_len.len() < n + 1 {
                    return Err(PineError::malformed(format!(
                        "table entry declares {n} code bytes but {} bytes remain",
                        after_len.len()
                    )));
                }

                let code = read_code(pad, &after_len[..n])?;
                table.insert(after_len[n], code)?;
                rest = &after_len[n + 1..];
            }
        }
    }

    Ok(table)
}

/// Deserializes a table straight into the tree the decoder walks.
pub fn tree_from_bytes(bytes: &[u8], layout: TableLayout) -> Result<SymbolTree> {
    SymbolTree::from_code_table(&code_table_from_bytes(bytes, layout)?)
}

fn read_code(pad: u8, code_bytes: &[u8]) -> Result<BitString> {
    if pad > 7 {
        return Err(PineError::malformed(format!("code padding {pad} exceeds 7")));
    }
    let code = BitString::from_padded_bytes(code_bytes, pad)?;
    if code.is_empty() {
        return Err(PineError::malformed("table entry holds an empty code"));
    }
    Ok(code)
}
