use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    bitstreams::{padding_for, BinaryWriterBuilder},
    error::{PineError, Result},
    huffman::{tree_builder::build_tree, CodeTable, Decoder, SymbolCounts},
    pine::{table, PineContainer},
    properties::PineProperties,
};

/// Summary of one file compression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    pub original_len: u64,
    pub compressed_len: usize,
    pub distinct_symbols: usize,
    pub encoded_bits: usize,
}

/// Compresses and decompresses byte streams to and from `.pine` containers.
#[derive(Clone, Debug, Default)]
pub struct HuffmanCoding {
    properties: PineProperties,
}

/// Emits codes for successive chunks of the source into a payload that was
/// already left-padded for the total number of bits.
struct PayloadEncoder<'a> {
    table: &'a CodeTable,
    writer: BinaryWriterBuilder,
    tail_padding: u8,
    expected_bits: usize,
}

impl<'a> PayloadEncoder<'a> {
    fn new(table: &'a CodeTable, counts: &SymbolCounts) -> Result<Self> {
        let bits = table.encoded_bit_len(counts)?;
        let tail_padding = padding_for(bits);

        let mut writer = BinaryWriterBuilder::with_capacity((bits + 7) / 8);
        writer.push_zeros(tail_padding as usize);

        Ok(Self { table, writer, tail_padding, expected_bits: bits })
    }

    fn push_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        for &symbol in chunk {
            let code = self.table.get(symbol).ok_or(PineError::SymbolNotInTable(symbol))?;
            self.writer.push_code(code);
        }
        Ok(())
    }

    fn finish(self) -> Result<(u8, Vec<u8>)> {
        let emitted = self.writer.written_bits - self.tail_padding as usize;
        if emitted != self.expected_bits {
            return Err(PineError::SourceChanged { expected: self.expected_bits, emitted });
        }
        Ok((self.tail_padding, self.writer.build()?))
    }
}

impl HuffmanCoding {
    pub fn new(properties: PineProperties) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &PineProperties {
        &self.properties
    }

    /// Derives the code table for a counted source.
    pub fn code_table(counts: &SymbolCounts) -> Result<CodeTable> {
        debug!(distinct = counts.distinct(), total = counts.total(), "generating huffman tree");
        let tree = build_tree(counts)?;

        let table = CodeTable::from_tree(&tree)?;
        debug_assert!(table.is_prefix_free());
        debug!(codes = table.len(), "generated code table");

        Ok(table)
    }

    fn assemble(
        &self,
        table: &CodeTable,
        tail_padding: u8,
        payload: Vec<u8>,
    ) -> Result<PineContainer> {
        let table_bytes = table::bytes_from_code_table(table, self.properties.table_layout)?;
        let max = self.properties.tree_magnitude.max_table_size();
        if table_bytes.len() > max {
            return Err(PineError::TableTooLarge { size: table_bytes.len(), max });
        }

        Ok(PineContainer { tail_padding, table_bytes, payload })
    }

    pub fn encode(&self, data: &[u8]) -> Result<PineContainer> {
        self.encode_with_table(data).map(|(container, _)| container)
    }

    /// Encodes an in-memory source, also returning the code table it used.
    pub fn encode_with_table(&self, data: &[u8]) -> Result<(PineContainer, CodeTable)> {
        let counts = SymbolCounts::from_bytes(data);
        let table = Self::code_table(&counts)?;

        let mut encoder = PayloadEncoder::new(&table, &counts)?;
        encoder.push_chunk(data)?;
        let (tail_padding, payload) = encoder.finish()?;

        let container = self.assemble(&table, tail_padding, payload)?;
        Ok((container, table))
    }

    /// Encodes a seekable source in two passes, counting first and emitting after a rewind,
    /// reading `chunk_size` bytes at a time.
    pub fn encode_source<R: Read + Seek>(
        &self,
        source: &mut R,
    ) -> Result<(PineContainer, CodeTable)> {
        let start = source.stream_position()?;

        debug!("getting symbol frequencies");
        let counts = SymbolCounts::from_reader(source, self.properties.chunk_size)?;
        let table = Self::code_table(&counts)?;

        source.seek(SeekFrom::Start(start))?;

        debug!("packing payload");
        let mut encoder = PayloadEncoder::new(&table, &counts)?;
        let mut buf = vec![0u8; self.properties.chunk_size.max(1)];
        loop {
            let read = source.read(&mut buf)?;
            if read == 0 {
                break;
            }
            encoder.push_chunk(&buf[..read])?;
        }
        let (tail_padding, payload) = encoder.finish()?;

        let container = self.assemble(&table, tail_padding, payload)?;
        Ok((container, table))
    }

    pub fn decode(&self, container: &PineContainer) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(container.payload.len() * 2);
        self.decode_to(container, &mut out)?;
        Ok(out)
    }

    /// Decodes the payload symbol by symbol into `sink`, returning the number of symbols written.
    pub fn decode_to<W: Write>(&self, container: &PineContainer, sink: &mut W) -> Result<usize> {
        let tree = table::tree_from_bytes(&container.table_bytes, self.properties.table_layout)?;
        debug!(nodes = tree.num_nodes(), leaves = tree.num_leaves(), "rebuilt huffman tree");

        let chunk = self.properties.chunk_size.max(1);
        let mut written = 0;
        let mut buf = Vec::with_capacity(chunk);
        for symbol in Decoder::new(&tree, &container.payload, container.tail_padding)? {
            buf.push(symbol?);
            if buf.len() == chunk {
                sink.write_all(&buf)?;
                written += buf.len();
                buf.clear();
            }
        }
        sink.write_all(&buf)?;
        written += buf.len();

        Ok(written)
    }

    /// Parses a whole `.pine` file image and decodes it.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let container = PineContainer::from_bytes(bytes, self.properties.tree_magnitude)?;
        self.decode(&container)
    }

    pub fn encode_to_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.encode(data)?.to_bytes(self.properties.tree_magnitude)
    }

    pub fn compress_file(&self, src: &Path, dst: &Path) -> Result<(CompressionStats, CodeTable)> {
        let mut source = BufReader::new(File::open(src)?);
        let mut sink = BufWriter::new(File::create(dst)?);

        let encoded = self.encode_source(&mut source).and_then(|(container, table)| {
            container.write_to(&mut sink, self.properties.tree_magnitude)?;
            sink.flush()?;
            Ok((container, table))
        });
        let (container, table) = match encoded {
            Ok(encoded) => encoded,
            Err(e) => {
                // a truncated container is never left behind
                drop(sink);
                fs::remove_file(dst)?;
                return Err(e);
            }
        };
        let original_len = source.stream_position()?;

        let stats = CompressionStats {
            original_len,
            compressed_len: container.file_len(self.properties.tree_magnitude),
            distinct_symbols: table.len(),
            encoded_bits: container.encoded_bit_len(),
        };
        info!(src = %src.display(), dst = %dst.display(), ?stats, "compressed file");

        Ok((stats, table))
    }

    /// Returns the number of bytes written to `dst`.
    pub fn decompress_file(&self, src: &Path, dst: &Path) -> Result<usize> {
        let mut source = BufReader::new(File::open(src)?);
        let container = PineContainer::read_from(&mut source, self.properties.tree_magnitude)?;

        let mut sink = BufWriter::new(File::create(dst)?);
        let decoded = self.decode_to(&container, &mut sink);
        let written = match decoded.and_then(|n| sink.flush().map(|_| n).map_err(PineError::from)) {
            Ok(n) => n,
            Err(e) => {
                // a partially decoded file is never left behind
                drop(sink);
                fs::remove_file(dst)?;
                return Err(e);
            }
        };

        info!(src = %src.display(), dst = %dst.display(), written, "decompressed file");
        Ok(written)
    }
}
