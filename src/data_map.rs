use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

/// Application data shared by every route handler, middleware and the error handler, one value
/// per type.
#[derive(Default)]
pub(crate) struct DataMap {
    inner: HashMap<TypeId, Box<dyn Any + Send + Sync + 'static>>,
}

impl DataMap {
    pub fn new() -> DataMap {
        DataMap::default()
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) {
        self.inner.insert(TypeId::of::<T>(), Box::new(val));
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.get(&TypeId::of::<T>()).and_then(|b| b.downcast_ref::<T>())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Debug for DataMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DataMap {{ entries: {} }}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::DataMap;

    #[test]
    fn keeps_one_value_per_type() {
        let mut map = DataMap::new();
        map.insert(1_u32);
        map.insert(String::from("first"));
        map.insert(String::from("second"));

        assert_eq!(map.get::<u32>(), Some(&1));
        assert_eq!(map.get::<String>().map(String::as_str), Some("second"));
        assert_eq!(map.get::<u64>(), None);
        assert_eq!(map.len(), 2);
    }
}
