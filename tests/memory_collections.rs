//! # End-to-End Accessor and Collection Tests
//!
//! Full-stack scenarios driving the public API the way an embedding host
//! would: define record types, bind accessors, move values through buffers,
//! and exercise the value-semantics collections at size.
//!
//! ## Test Coverage
//!
//! 1. Accessor round trips (zeroed values, initialized values, arrays)
//! 2. Path offsets against bound layouts
//! 3. Large map workloads (100k integer mappings)
//! 4. Boolean and struct-keyed maps
//! 5. Sequence equality semantics
//! 6. Allocator interchangeability (heap and arena)

use memlay::{record, Accessor, ArenaAllocator, HeapAllocator, ValueMap, ValueVec};

record! {
    pub struct Point {
        pub x: i32,
        pub y: i32,
    }
}

record! {
    #[derive(Hash)]
    pub struct Coord {
        pub row: i32,
        pub col: i32,
    }
}

#[test]
fn test_zeroed_value_decodes_to_default_record() {
    let alloc = HeapAllocator;
    let access = Accessor::<Point>::new().unwrap();
    let buf = access.new_value(&alloc).unwrap();
    assert_eq!(access.get(&buf).unwrap(), Point { x: 0, y: 0 });
}

#[test]
fn test_initialized_value_round_trips() {
    let alloc = HeapAllocator;
    let access = Accessor::<Point>::new().unwrap();
    let buf = access
        .new_value_with(&alloc, &Point { x: 1, y: 2 })
        .unwrap();
    assert_eq!(access.get(&buf).unwrap(), Point { x: 1, y: 2 });
}

#[test]
fn test_array_of_ten_points() {
    let alloc = HeapAllocator;
    let access = Accessor::<Point>::new().unwrap();
    let mut buf = access.new_array(&alloc, 10).unwrap();
    for i in 0..10i32 {
        access
            .set_at(&mut buf, i as usize, &Point { x: i, y: -i })
            .unwrap();
    }
    assert_eq!(access.get_at(&buf, 7).unwrap(), Point { x: 7, y: -7 });

    let decoded: Vec<Point> = access.iter(&buf).unwrap().map(|p| p.unwrap()).collect();
    assert_eq!(decoded.len(), 10);
    assert_eq!(decoded[3], Point { x: 3, y: -3 });
}

#[test]
fn test_point_layout_offsets() {
    let access = Accessor::<Point>::new().unwrap();
    assert_eq!(access.byte_offset(".x").unwrap(), 0);
    assert_eq!(access.byte_offset(".y").unwrap(), 4);
    assert_eq!(access.layout().size, 8);
}

#[test]
fn test_hundred_thousand_integer_mappings() {
    let alloc = HeapAllocator;
    let mut map = ValueMap::<i32, i32>::new(&alloc).unwrap();
    for i in 0..100_000 {
        assert_eq!(map.put(i, i).unwrap(), None);
    }
    assert_eq!(map.len(), 100_000);
    for i in 0..100_000 {
        assert_eq!(map.get(&i).unwrap(), Some(i));
    }
    assert_eq!(map.get(&100_000).unwrap(), None);
}

#[test]
fn test_boolean_map_holds_single_mapping() {
    let alloc = HeapAllocator;
    let mut map = ValueMap::<bool, bool>::new(&alloc).unwrap();
    map.put(true, false).unwrap();
    assert_eq!(map.len(), 1);

    let entries: Vec<(bool, bool)> = map.entries().map(|e| e.unwrap()).collect();
    assert_eq!(entries, vec![(true, false)]);
}

#[test]
fn test_struct_keyed_map_against_reference_model() {
    let alloc = HeapAllocator;
    let mut map = ValueMap::<Coord, i64>::new(&alloc).unwrap();
    let mut model = std::collections::HashMap::new();

    for row in 0..32 {
        for col in 0..32 {
            let key = Coord { row, col };
            let value = (row * 1000 + col) as i64;
            map.put(key, value).unwrap();
            model.insert((row, col), value);
        }
    }
    // Overwrite a band, remove a band.
    for col in 0..32 {
        map.put(Coord { row: 5, col }, -1).unwrap();
        model.insert((5, col), -1);
        map.remove(&Coord { row: 9, col }).unwrap();
        model.remove(&(9, col));
    }

    assert_eq!(map.len(), model.len());
    let mut from_map: Vec<((i32, i32), i64)> = map
        .entries()
        .map(|e| e.unwrap())
        .map(|(k, v)| ((k.row, k.col), v))
        .collect();
    from_map.sort_unstable();
    let mut from_model: Vec<((i32, i32), i64)> = model.into_iter().collect();
    from_model.sort_unstable();
    assert_eq!(from_map, from_model);
}

#[test]
fn test_sequence_equality_is_structural() {
    let alloc = HeapAllocator;
    let mut a = ValueVec::<Point>::new(&alloc).unwrap();
    let mut b = ValueVec::<Point>::with_capacity(&alloc, 2).unwrap();
    for i in 0..17i32 {
        a.push(&Point { x: i, y: i + 1 }).unwrap();
        b.push(&Point { x: i, y: i + 1 }).unwrap();
    }
    assert_eq!(a, b);

    // A strict prefix is not equal.
    b.remove(16).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_collections_share_an_arena() {
    let arena = ArenaAllocator::new();
    let mut vec = ValueVec::<Point>::with_capacity(&arena, 4).unwrap();
    let mut map = ValueMap::<i32, Point>::with_capacity(&arena, 4).unwrap();

    for i in 0..100i32 {
        let p = Point { x: i, y: i * i };
        vec.push(&p).unwrap();
        map.put(i, p).unwrap();
    }
    assert_eq!(vec.len(), 100);
    assert_eq!(map.len(), 100);
    for i in 0..100i32 {
        assert_eq!(vec.get(i as usize).unwrap(), map.get(&i).unwrap().unwrap());
    }
    assert!(arena.allocated_bytes() > 0);
}

#[test]
fn test_vec_insert_remove_against_reference_model() {
    let alloc = HeapAllocator;
    let mut vec = ValueVec::<i64>::new(&alloc).unwrap();
    let mut model: Vec<i64> = Vec::new();

    for i in 0..200i64 {
        match i % 4 {
            0 => {
                vec.push(&i).unwrap();
                model.push(i);
            }
            1 => {
                let at = (i as usize * 7) % (model.len() + 1);
                vec.insert(at, &i).unwrap();
                model.insert(at, i);
            }
            2 if !model.is_empty() => {
                let at = (i as usize * 13) % model.len();
                assert_eq!(vec.remove(at).unwrap(), model.remove(at));
            }
            _ => {
                if !model.is_empty() {
                    let at = (i as usize * 3) % model.len();
                    let new = i * 100;
                    let old = vec.set(at, &new).unwrap();
                    assert_eq!(old, model[at]);
                    model[at] = new;
                }
            }
        }
    }

    assert_eq!(vec.len(), model.len());
    let all: Vec<i64> = (0..vec.len()).map(|i| vec.get(i).unwrap()).collect();
    assert_eq!(all, model);
}
