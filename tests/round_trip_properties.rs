//! Property-based tests for the Huffman coder and the `.pine` container.

use proptest::prelude::*;

use pine_huffman::{
    huffman::{tree_builder::build_tree, CodeTable, SymbolCounts},
    HuffmanCoding, PineContainer, PineError, PineProperties, TableLayout, TreeMagnitude,
};

fn properties_strategy() -> impl Strategy<Value = PineProperties> {
    (
        prop_oneof![Just(TreeMagnitude::Two), Just(TreeMagnitude::Four)],
        1usize..64,
    )
        .prop_map(|(tree_magnitude, chunk_size)| PineProperties {
            tree_magnitude,
            table_layout: TableLayout::LengthPrefixed,
            chunk_size,
        })
}

/// Inputs drawn from a small alphabet, so frequencies tie and codes vary in length.
fn skewed_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            8 => Just(b'e'),
            4 => Just(b't'),
            2 => prop::sample::select(b"aoins".to_vec()),
            1 => any::<u8>(),
        ],
        1..2000,
    )
}

proptest! {
    #[test]
    fn round_trip(
        data in prop::collection::vec(any::<u8>(), 1..2000),
        props in properties_strategy()
    ) {
        let coding = HuffmanCoding::new(props);
        let bytes = coding.encode_to_bytes(&data).unwrap();
        prop_assert_eq!(coding.decode_bytes(&bytes).unwrap(), data);
    }

    #[test]
    fn round_trip_skewed(data in skewed_bytes()) {
        let coding = HuffmanCoding::default();
        let container = coding.encode(&data).unwrap();
        prop_assert_eq!(coding.decode(&container).unwrap(), data);
    }

    #[test]
    fn round_trip_sentinel_layout(data in prop::collection::vec(0u8..0x80, 1..500)) {
        // symbols stay below 0xFF, but a code byte may still collide with the sentinel
        let coding = HuffmanCoding::new(PineProperties {
            table_layout: TableLayout::Sentinel,
            ..Default::default()
        });
        match coding.encode(&data) {
            Ok(container) => {
                prop_assert_eq!(coding.decode(&container).unwrap(), data);
            }
            Err(PineError::SentinelCollision(_)) => {}
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        }
    }

    #[test]
    fn codes_are_prefix_free(data in skewed_bytes()) {
        let tree = build_tree(&SymbolCounts::from_bytes(&data)).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();

        prop_assert!(table.is_prefix_free());
        for (a, code_a) in table.iter() {
            prop_assert!(!code_a.is_empty());
            for (b, code_b) in table.iter() {
                if a != b {
                    prop_assert!(!code_a.is_prefix_of(code_b));
                }
            }
        }
    }

    #[test]
    fn container_size_and_padding(data in skewed_bytes(), props in properties_strategy()) {
        let coding = HuffmanCoding::new(props.clone());
        let (container, table) = coding.encode_with_table(&data).unwrap();
        let bytes = container.to_bytes(props.tree_magnitude).unwrap();

        let width = props.tree_magnitude.width();
        let declared = bytes[..width].iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
        prop_assert_eq!(declared, container.table_bytes.len());
        prop_assert_eq!(bytes.len(), declared + 1 + width + container.payload.len());
        prop_assert!(container.tail_padding <= 7);

        let counts = SymbolCounts::from_bytes(&data);
        prop_assert_eq!(container.encoded_bit_len(), table.encoded_bit_len(&counts).unwrap());

        let parsed = PineContainer::from_bytes(&bytes, props.tree_magnitude).unwrap();
        prop_assert_eq!(parsed, container);
    }

    #[test]
    fn deterministic(data in skewed_bytes()) {
        let coding = HuffmanCoding::default();
        let first = coding.encode_to_bytes(&data).unwrap();
        prop_assert_eq!(first, coding.encode_to_bytes(&data).unwrap());
    }

    #[test]
    fn single_symbol(symbol in any::<u8>(), n in 1usize..300) {
        let data = vec![symbol; n];
        let coding = HuffmanCoding::default();
        let container = coding.encode(&data).unwrap();
        prop_assert_eq!(container.encoded_bit_len(), n);
        prop_assert_eq!(coding.decode(&container).unwrap(), data);
    }

    #[test]
    fn truncated_headers_fail(data in skewed_bytes(), cut in 0usize..4) {
        let coding = HuffmanCoding::default();
        let container = coding.encode(&data).unwrap();
        let bytes = container.to_bytes(TreeMagnitude::Two).unwrap();
        // every cut lands inside the header or before the first table byte
        prop_assert!(!container.table_bytes.is_empty());
        prop_assert!(coding.decode_bytes(&bytes[..cut]).is_err());
    }
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(HuffmanCoding::default().encode(&[]), Err(PineError::EmptyInput)));
}
