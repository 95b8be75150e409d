//! Homogeneous lists.

use crate::{
    bin::BinWriter,
    error::{Result, ResultExt},
    journal::ErrorJournal,
    node::*,
    bail,
};
use std::{
    any::{Any, type_name},
    ops::{AddAssign, Index},
    slice,
};


/// Ordered sequence of nodes of one declared type.
///
/// Binary form is an `i32` element count followed by each element. Text form
/// is an array.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformList<T> {
    items: Vec<T>,
}

impl<T> Default for UniformList<T> {
    fn default() -> Self {
        UniformList { items: Vec::new() }
    }
}

impl<T> UniformList<T> {
    pub fn new() -> Self {
        UniformList::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.items.get_mut(i)
    }

    pub fn iter(&self) -> slice::Iter<T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: 'static> UniformList<T> {
    /// Push a type-erased node. Fails without touching the list if it is not
    /// a `T`.
    pub fn push_any(&mut self, item: Box<dyn Any>) -> Result<()> {
        match item.downcast::<T>() {
            Ok(item) => {
                self.items.push(*item);
                Ok(())
            }
            Err(_) => bail!(
                TypeMismatch,
                "list of {} cannot hold the given value",
                type_name::<T>(),
            ),
        }
    }

    /// Append every element of a type-erased list. Fails without touching
    /// this list unless `other` is a list of the same element type.
    pub fn append_any(&mut self, other: Box<dyn Any>) -> Result<()> {
        match other.downcast::<UniformList<T>>() {
            Ok(other) => {
                *self += *other;
                Ok(())
            }
            Err(_) => bail!(
                TypeMismatch,
                "cannot append to a list of {} from a list of another type",
                type_name::<T>(),
            ),
        }
    }
}

impl<T> AddAssign for UniformList<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.items.extend(rhs.items);
    }
}

impl<T> Index<usize> for UniformList<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.items[i]
    }
}

impl<T> From<Vec<T>> for UniformList<T> {
    fn from(items: Vec<T>) -> Self {
        UniformList { items }
    }
}

impl<T> FromIterator<T> for UniformList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        UniformList { items: iter.into_iter().collect() }
    }
}

impl<'a, T> IntoIterator for &'a UniformList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: MapNode + Default> MapNode for UniformList<T> {
    fn set_default(&mut self) {
        self.items.clear();
    }

    fn to_json(&self) -> Json {
        Json::Array(self.items.iter().map(MapNode::to_json).collect())
    }

    fn set_json(&mut self, json: &Json) -> Result<()> {
        let array = expect_array(json, "list")?;
        let mut items = Vec::with_capacity(array.len());
        for (i, value) in array.iter().enumerate() {
            let mut item = T::default();
            item.set_json(value).within(&format!("[{}]", i))?;
            items.push(item);
        }
        self.items = items;
        Ok(())
    }

    fn encode(&self, bin: &mut BinWriter) -> Result<()> {
        bin.write_len(self.items.len())?;
        for (i, item) in self.items.iter().enumerate() {
            item.encode(bin).within(&format!("[{}]", i))?;
        }
        Ok(())
    }
}

impl<T: Inspect> Inspect for UniformList<T> {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        for (i, item) in self.items.iter().enumerate() {
            journal.inspect_child(format!("index {}", i), item);
        }
    }
}


#[test]
fn test_foreign_types_do_not_mutate() {
    use crate::{leaf::*, error::ErrorKind};

    let mut list = UniformList::<FloatValue>::new();
    list.push(FloatValue::new(1.0));
    list.push_any(Box::new(FloatValue::new(2.0))).unwrap();

    let e = list.push_any(Box::new(IntValue::new(3))).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TypeMismatch);
    assert_eq!(list.len(), 2);

    let ints = UniformList::from(vec![IntValue::new(4)]);
    let e = list.append_any(Box::new(ints)).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TypeMismatch);
    assert_eq!(list.len(), 2);

    let more = UniformList::from(vec![FloatValue::new(5.0)]);
    list.append_any(Box::new(more)).unwrap();
    list += UniformList::from(vec![FloatValue::new(6.0)]);
    let values = list.iter().map(FloatValue::get).collect::<Vec<_>>();
    assert_eq!(values, vec![1.0, 2.0, 5.0, 6.0]);
}

#[test]
fn test_list_json_load_is_atomic() {
    use crate::leaf::IntValue;
    use serde_json::json;

    let mut list = UniformList::from(vec![IntValue::new(1)]);
    let e = list.set_json(&json!([2, "three", 4])).unwrap_err();
    assert_eq!(e.path(), &["[1]".to_owned()]);
    assert_eq!(list.len(), 1);

    list.set_json(&json!([2, 3])).unwrap();
    assert_eq!(list.to_json(), json!([2, 3]));
    assert_eq!(
        encode_to_vec(&list).unwrap(),
        vec![2, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0],
    );
}
