#![cfg(test)]

// Property tests for KeyedMap kept inside the crate next to the structure
// they model.

use crate::keyed_map::{GroupAs, KeyedMap};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Get),
            2 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap plus
// a first-insertion order log.
// - Upserts return the displaced value and never change the position of a key.
// - `get`/`contains_key`/`index_of` parity with the model.
// - Iteration order equals first-insertion order since the last clear.
// - `len` parity and power-of-two capacity after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: KeyedMap<String, i32> = KeyedMap::with_capacity(1);
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i].clone();
                    let expected = model.insert(k.clone(), v);
                    if expected.is_none() {
                        order.push(k.clone());
                    }
                    prop_assert_eq!(sut.insert(k, v), expected);
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k.as_str()), model.get(k));
                    let pos = order.iter().position(|o| o == k);
                    prop_assert_eq!(sut.index_of(k.as_str()), pos);
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    if let Some(v) = sut.get_mut(k.as_str()) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(k) {
                        *v = v.wrapping_add(d);
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    order.clear();
                }
                OpI::Iterate => {
                    let keys: Vec<&String> = sut.keys().collect();
                    let expected: Vec<&String> = order.iter().collect();
                    prop_assert_eq!(keys, expected);
                    for e in &sut {
                        prop_assert_eq!(Some(e.value()), model.get(e.key()));
                    }
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity().is_power_of_two());
            prop_assert!(sut.len() <= sut.capacity() / 2);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    path: String,
}

impl GroupAs<String> for Node {
    fn group_as(&self, head: &String) -> bool {
        self.path.starts_with(head.as_str()) && self.path.len() > head.len()
    }
}

// Property: runs of members added right after their head come back from
// `group_of` exactly, in order, regardless of how often the table grew.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_consecutive_groups(runs in proptest::collection::vec(0usize..12, 1..24)) {
        let mut m: KeyedMap<String, Node> = KeyedMap::with_capacity(2);
        for (g, &members) in runs.iter().enumerate() {
            let head = format!("g{g}/");
            m.insert_grouped(head.clone(), Node { path: head.clone() });
            for j in 0..members {
                let path = format!("{head}{j}");
                m.insert_grouped(path.clone(), Node { path });
            }
        }
        for (g, &members) in runs.iter().enumerate() {
            let head = format!("g{g}/");
            let got: Vec<String> = m.group_of(head.as_str()).map(|n| n.path.clone()).collect();
            let want: Vec<String> = (0..members).map(|j| format!("{head}{j}")).collect();
            prop_assert_eq!(got, want);
            for j in 0..members {
                prop_assert_eq!(m.group_of(format!("{head}{j}").as_str()).len(), 0);
            }
        }
    }
}
