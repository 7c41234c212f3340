/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Lists get keys `0..n`, maps keep their keys in order, and anything else goes
/// through `Value::from`.
///
/// ```rust
/// use serde_php::{php, render};
///
/// let value = php!({ "id": 7, "tags": ["a"], "parent": null });
/// assert_eq!(
///     render(&value),
///     b"a:3:{s:2:\"id\";i:7;s:4:\"tags\";a:1:{i:0;s:1:\"a\";}s:6:\"parent\";N;}"
/// );
/// ```
#[macro_export]
macro_rules! php {
    (null) => {
        $crate::Value::null()
    };

    (true) => {
        $crate::Value::from(true)
    };

    (false) => {
        $crate::Value::from(false)
    };

    ([]) => {
        $crate::Value::list(::std::vec::Vec::<$crate::Value>::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::list(vec![$($crate::php!($elem)),*])
    };

    ({}) => {
        $crate::Value::array(::std::vec::Vec::<($crate::Key, $crate::Value)>::new())
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::Value::array(vec![$(($crate::Key::from($key), $crate::php!($value))),*])
    };

    // Any other expression
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Entry, Key, Value, ValueKind};

    #[test]
    fn test_php_macro_primitives() {
        assert_eq!(php!(null), Value::null());
        assert_eq!(php!(true), Value::from(true));
        assert_eq!(php!(false), Value::from(false));
        assert_eq!(php!(42), Value::from(42));
        assert_eq!(php!(3.5), Value::from(3.5));
        assert_eq!(php!("hello"), Value::from("hello"));
    }

    #[test]
    fn test_php_macro_lists() {
        assert_eq!(php!([]), Value::from(ValueKind::Array(vec![])));

        let list = php!([1, "two", [3]]);
        let entries = list.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], Entry::new(1, "two"));
        assert_eq!(entries[2].value.get(0), Some(&Value::from(3)));
    }

    #[test]
    fn test_php_macro_maps() {
        assert_eq!(php!({}), Value::from(ValueKind::Array(vec![])));

        let map = php!({ "name": "Alice", 10: 30 });
        let entries = map.as_array().unwrap();
        assert_eq!(entries[0].key, Key::from("name"));
        assert_eq!(entries[1].key, Key::Int(10));
        assert_eq!(map.get(10), Some(&Value::from(30)));
    }
}
