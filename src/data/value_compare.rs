use crate::data::datatable::DataValue;
use std::cmp::Ordering;

/// Compare two DataValues with a total order over all variants.
///
/// Same-type comparisons are natural; Integer and Float compare numerically;
/// Null sorts below everything and equal to another Null. Remaining
/// cross-type pairs order by a fixed type rank so mixed columns still sort
/// deterministically: Null < Boolean < numeric < String < DateTime.
pub fn compare_values(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),

        (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),

        (DataValue::String(a), DataValue::String(b)) => a.cmp(b),

        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),

        (DataValue::DateTime(a), DataValue::DateTime(b)) => a.cmp(b),

        // Null handling
        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        (DataValue::Null, _) => Ordering::Less,
        (_, DataValue::Null) => Ordering::Greater,

        // Numeric cross-type: compare actual values, not types
        (DataValue::Integer(i), DataValue::Float(f)) => {
            (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal)
        }
        (DataValue::Float(f), DataValue::Integer(i)) => {
            f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal)
        }

        // Everything else falls back to type rank
        (a, b) => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Integer(_) | DataValue::Float(_) => 2,
        DataValue::String(_) => 3,
        DataValue::DateTime(_) => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_comparison() {
        assert_eq!(
            compare_values(&DataValue::Integer(1), &DataValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&DataValue::Integer(2), &DataValue::Integer(2)),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&DataValue::Integer(3), &DataValue::Integer(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(
            compare_values(
                &DataValue::String("apple".to_string()),
                &DataValue::String("banana".to_string())
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_null_comparison() {
        assert_eq!(
            compare_values(&DataValue::Null, &DataValue::Integer(1)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&DataValue::Integer(1), &DataValue::Null),
            Ordering::Greater
        );
        assert_eq!(compare_values(&DataValue::Null, &DataValue::Null), Ordering::Equal);
    }

    #[test]
    fn test_numeric_cross_type() {
        assert_eq!(
            compare_values(&DataValue::Integer(2), &DataValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&DataValue::Float(1.5), &DataValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&DataValue::Integer(2), &DataValue::Float(2.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_cross_type_rank() {
        assert_eq!(
            compare_values(&DataValue::Boolean(true), &DataValue::Integer(1)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&DataValue::Float(1.0), &DataValue::String("a".to_string())),
            Ordering::Less
        );
        assert_eq!(
            compare_values(
                &DataValue::DateTime("2024-01-01".to_string()),
                &DataValue::String("z".to_string())
            ),
            Ordering::Greater
        );
    }
}
