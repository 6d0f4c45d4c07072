use super::{table::*, *};
use crate::huffman::{tree_builder::build_tree, CodeTable, SymbolCounts};

fn table_of(bytes: &[u8]) -> CodeTable {
    CodeTable::from_tree(&build_tree(&SymbolCounts::from_bytes(bytes)).unwrap()).unwrap()
}

#[test]
fn test_sentinel_layout_bytes() {
    // a -> "0", b -> "1"
    let table = table_of(b"aaab");
    let bytes = bytes_from_code_table(&table, TableLayout::Sentinel).unwrap();
    assert_eq!(bytes, vec![7, 0x00, b'a', 0xFF, 7, 0x01, b'b', 0xFF]);
}

#[test]
fn test_length_prefixed_layout_bytes() {
    let table = table_of(b"aaab");
    let bytes = bytes_from_code_table(&table, TableLayout::LengthPrefixed).unwrap();
    assert_eq!(bytes, vec![7, 1, 0x00, b'a', 7, 1, 0x01, b'b']);
}

#[test]
fn test_table_round_trip_both_layouts() {
    let table = table_of(b"the quick brown fox jumps over the lazy dog");
    for layout in [TableLayout::Sentinel, TableLayout::LengthPrefixed] {
        let bytes = bytes_from_code_table(&table, layout).unwrap();
        assert_eq!(code_table_from_bytes(&bytes, layout).unwrap(), table);
        assert_eq!(
            CodeTable::from_tree(&tree_from_bytes(&bytes, layout).unwrap()).unwrap(),
            table
        );
    }
}

#[test]
fn test_sentinel_collision() {
    let table = table_of(&[0xFF, 0xFF, 0x01]);
    assert!(matches!(
        bytes_from_code_table(&table, TableLayout::Sentinel),
        Err(PineError::SentinelCollision(0xFF))
    ));

    let bytes = bytes_from_code_table(&table, TableLayout::LengthPrefixed).unwrap();
    assert_eq!(code_table_from_bytes(&bytes, TableLayout::LengthPrefixed).unwrap(), table);
}

#[test]
fn test_long_codes_length_prefixed() {
    // Fibonacci weights give a maximally skewed tree with codes longer than 8 bits
    let mut data = Vec::new();
    let (mut a, mut b) = (1usize, 1usize);
    for symbol in 0..14u8 {
        data.extend(std::iter::repeat(symbol).take(a));
        (a, b) = (b, a + b);
    }
    let table = table_of(&data);
    assert!(table.iter().any(|(_, code)| code.len() > 8));

    let bytes = bytes_from_code_table(&table, TableLayout::LengthPrefixed).unwrap();
    assert_eq!(code_table_from_bytes(&bytes, TableLayout::LengthPrefixed).unwrap(), table);
}

#[test]
fn test_malformed_tables() {
    // entry missing its symbol
    assert!(matches!(
        code_table_from_bytes(&[7, 0x00, 0xFF], TableLayout::Sentinel),
        Err(PineError::MalformedContainer(_))
    ));
    // declares two code bytes, only one follows
    assert!(matches!(
        code_table_from_bytes(&[0, 2, 0x00, b'a'], TableLayout::LengthPrefixed),
        Err(PineError::MalformedContainer(_))
    ));
    // zero code bytes
    assert!(matches!(
        code_table_from_bytes(&[0, 0, b'a'], TableLayout::LengthPrefixed),
        Err(PineError::MalformedContainer(_))
    ));
    // padding swallows the whole code byte
    assert!(matches!(
        code_table_from_bytes(&[8, 1, 0x00, b'a'], TableLayout::LengthPrefixed),
        Err(PineError::MalformedContainer(_))
    ));
    // no entries at all
    assert!(tree_from_bytes(&[], TableLayout::Sentinel).is_err());
}

#[test]
fn test_tree_magnitude() {
    assert_eq!(TreeMagnitude::default(), TreeMagnitude::Two);
    assert_eq!(TreeMagnitude::try_from(4).unwrap(), TreeMagnitude::Four);
    assert!(TreeMagnitude::try_from(3).is_err());
    assert_eq!(TreeMagnitude::Two.encode_size(0x0102).unwrap(), vec![0x01, 0x02]);
    assert_eq!(TreeMagnitude::Four.encode_size(0x0102).unwrap(), vec![0, 0, 0x01, 0x02]);
    assert!(matches!(
        TreeMagnitude::Two.encode_size(70_000),
        Err(PineError::TableTooLarge { size: 70_000, max: 65_535 })
    ));
}

#[test]
fn test_table_layout_parse() {
    assert_eq!("Sentinel".parse::<TableLayout>().unwrap(), TableLayout::Sentinel);
    assert_eq!("lengthprefixed".parse::<TableLayout>().unwrap(), TableLayout::LengthPrefixed);
    assert!("csv".parse::<TableLayout>().is_err());
    assert_eq!(TableLayout::Sentinel.to_string(), "sentinel");
}

#[test]
fn test_container_layout() {
    let container = PineContainer {
        tail_padding: 4,
        table_bytes: vec![7, 0x00, b'a', 0xFF, 7, 0x01, b'b', 0xFF],
        payload: vec![0x01],
    };

    let two = container.to_bytes(TreeMagnitude::Two).unwrap();
    assert_eq!(&two[..3], &[0x00, 0x08, 0x04]);
    assert_eq!(two.len(), container.file_len(TreeMagnitude::Two));
    assert_eq!(two.len(), 2 + 1 + 8 + 1);
    assert_eq!(PineContainer::from_bytes(&two, TreeMagnitude::Two).unwrap(), container);

    let four = container.to_bytes(TreeMagnitude::Four).unwrap();
    assert_eq!(&four[..5], &[0x00, 0x00, 0x00, 0x08, 0x04]);
    assert_eq!(four.len(), 4 + 1 + 8 + 1);
    let mut cursor = std::io::Cursor::new(four);
    assert_eq!(PineContainer::read_from(&mut cursor, TreeMagnitude::Four).unwrap(), container);

    assert_eq!(container.encoded_bit_len(), 4);
}

#[test]
fn test_malformed_containers() {
    let malformed = |bytes: &[u8]| {
        matches!(
            PineContainer::from_bytes(bytes, TreeMagnitude::Two),
            Err(PineError::MalformedContainer(_))
        )
    };

    assert!(malformed(&[]));
    assert!(malformed(&[0x00, 0x01]));
    // table of 16 bytes declared, 2 present
    assert!(malformed(&[0x00, 0x10, 0x00, 1, 2]));
    // padding out of range
    assert!(malformed(&[0x00, 0x00, 0x08, 0xAA]));
    // no payload
    assert!(malformed(&[0x00, 0x01, 0x00, 0xAA]));
}

#[test]
fn test_write_rejects_bad_padding() {
    let container = PineContainer { tail_padding: 9, table_bytes: vec![], payload: vec![0] };
    assert!(container.to_bytes(TreeMagnitude::Two).is_err());
}
