use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::{
    error::{PineError, Result},
    TableLayout, TreeMagnitude,
};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Conventions shared by the encoder and the decoder of a `.pine` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PineProperties {
    pub tree_magnitude: TreeMagnitude,
    pub table_layout: TableLayout,
    /// Bytes read at a time when scanning a source
    pub chunk_size: usize,
}

impl Default for PineProperties {
    fn default() -> Self {
        Self {
            tree_magnitude: TreeMagnitude::Two,
            table_layout: TableLayout::LengthPrefixed,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PineProperties {
    /// Reads a Java-style `.properties` file. Missing keys keep their default.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let map = java_properties::read(BufReader::new(file)).map_err(|e| {
            PineError::properties(format!("failed parsing {}: {e}", path.display()))
        })?;
        Self::try_from(map)
    }
}

impl TryFrom<HashMap<String, String>> for PineProperties {
    type Error = PineError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = PineProperties::default();

        if let Some(magnitude) = value.get("treemagnitude") {
            let width: usize = magnitude.trim().parse().map_err(|_| {
                PineError::properties(format!("tree magnitude {magnitude} is not a number"))
            })?;
            props.tree_magnitude = TreeMagnitude::try_from(width)?;
        }
        if let Some(layout) = value.get("tablelayout") {
            props.table_layout = layout.parse()?;
        }
        if let Some(chunk_size) = value.get("chunksize") {
            props.chunk_size = match chunk_size.trim().parse() {
                Ok(0) | Err(_) => {
                    return Err(PineError::properties(format!(
                        "chunk size must be a positive integer, found {chunk_size}"
                    )))
                }
                Ok(n) => n,
            };
        }

        Ok(props)
    }
}

impl From<&PineProperties> for String {
    fn from(val: &PineProperties) -> Self {
        let mut s = String::new();

        s.push_str("#Pine properties\n");
        s.push_str(&format!("treemagnitude={}\n", val.tree_magnitude));
        s.push_str(&format!("tablelayout={}\n", val.table_layout));
        s.push_str(&format!("chunksize={}\n", val.chunk_size));

        s
    }
}
