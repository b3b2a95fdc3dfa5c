//! Tests for bounded field arrays

use proptest::prelude::*;

use domain_intake::{ArrayId, FieldArray, FieldArrayError, FieldValue};

use test_utils::{array_ops_strategy, ArrayOp};

// ============================================================================
// Capacity Tests
// ============================================================================

mod capacity_tests {
    use super::*;

    #[test]
    fn test_additional_files_hold_seven() {
        let mut array = FieldArray::new(ArrayId::AdditionalFiles, 7);
        for _ in 0..7 {
            array.append().unwrap();
        }
        assert!(array.is_full());

        let before = array.clone();
        assert_eq!(
            array.append(),
            Err(FieldArrayError::CapacityExceeded {
                array: ArrayId::AdditionalFiles,
                capacity: 7
            })
        );
        assert_eq!(array, before);
    }

    #[test]
    fn test_removal_frees_a_slot() {
        let mut array = FieldArray::new(ArrayId::AdditionalUrls, 5);
        for _ in 0..5 {
            array.append().unwrap();
        }
        array.remove(4).unwrap();
        assert!(array.append().is_ok());
    }
}

// ============================================================================
// Entry Identity Tests
// ============================================================================

mod entry_identity_tests {
    use super::*;

    #[test]
    fn test_entry_ids_survive_removal() {
        let mut array = FieldArray::new(ArrayId::AdditionalUrls, 5);
        let first = array.append_value(FieldValue::from("https://a.example")).unwrap();
        let second = array.append_value(FieldValue::from("https://b.example")).unwrap();

        array.remove(0).unwrap();
        assert_eq!(array.position(second), Some(0));
        assert_eq!(array.position(first), None);
    }

    #[test]
    fn test_set_keeps_entry_id() {
        let mut array = FieldArray::new(ArrayId::AdditionalUrls, 5);
        let id = array.append().unwrap();
        array.set(0, FieldValue::from("https://c.example")).unwrap();

        assert_eq!(array.get(0).map(|e| e.id), Some(id));
        assert!(matches!(
            array.set(3, FieldValue::Empty),
            Err(FieldArrayError::IndexOutOfRange { index: 3, len: 1, .. })
        ));
    }

    #[test]
    fn test_to_value_lists_entries_in_order() {
        let mut array = FieldArray::new(ArrayId::AdditionalUrls, 5);
        for url in ["https://1.example", "https://2.example"] {
            array.append_value(FieldValue::from(url)).unwrap();
        }
        assert_eq!(array.to_value().to_string(), "https://1.example, https://2.example");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(capacity in 1usize..10, ops in array_ops_strategy(40)) {
            let mut array = FieldArray::new(ArrayId::AdditionalFiles, capacity);
            for op in ops {
                match op {
                    ArrayOp::Append => {
                        let was_full = array.is_full();
                        prop_assert_eq!(array.append().is_err(), was_full);
                    }
                    ArrayOp::Remove(index) if !array.is_empty() => {
                        array.remove(index % array.len()).unwrap();
                    }
                    ArrayOp::Remove(_) => {}
                }
                prop_assert!(array.len() <= capacity);
            }
        }

        #[test]
        fn removal_preserves_relative_order(capacity in 1usize..10, ops in array_ops_strategy(40)) {
            let mut array = FieldArray::new(ArrayId::AdditionalUrls, capacity);
            let mut model = Vec::new();
            let mut counter = 0u32;
            for op in ops {
                match op {
                    ArrayOp::Append => {
                        counter += 1;
                        if array.append_value(FieldValue::from(counter.to_string())).is_ok() {
                            model.push(counter.to_string());
                        }
                    }
                    ArrayOp::Remove(index) if !model.is_empty() => {
                        let index = index % model.len();
                        array.remove(index).unwrap();
                        model.remove(index);
                    }
                    ArrayOp::Remove(_) => {}
                }
            }
            let texts: Vec<String> = array
                .values()
                .iter()
                .map(|entry| entry.value.to_string())
                .collect();
            prop_assert_eq!(texts, model);
        }
    }
}
