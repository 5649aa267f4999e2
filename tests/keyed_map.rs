use pooled_interchange::{GroupAs, Keyed, KeyedMap};

#[derive(Debug, Clone, PartialEq)]
struct Route {
    path: &'static str,
}

impl Keyed<&'static str> for Route {
    fn key(&self) -> &&'static str {
        &self.path
    }
}

// Nested paths group under the closest preceding prefix.
impl GroupAs<&'static str> for Route {
    fn group_as(&self, head: &&'static str) -> bool {
        self.path.len() > head.len() && self.path.starts_with(*head)
    }
}

fn route(path: &'static str) -> Route {
    Route { path }
}

// Test: duplicate adds overwrite in place.
// Verifies: count is the number of distinct keys and the last write wins.
#[test]
fn duplicate_add_overwrites() {
    let mut m = KeyedMap::new();
    assert_eq!(m.insert("a", 1), None);
    assert_eq!(m.insert("b", 2), None);
    assert_eq!(m.insert("a", 3), Some(1));
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("a"), Some(&3));
    assert_eq!(m.index_of("a"), Some(0));
    assert_eq!(m.get("zz"), None);
}

// Test: a head followed by two matching members.
// Verifies: group_of returns exactly the members, in insertion order.
#[test]
fn consecutive_members_form_group() {
    let mut m = KeyedMap::new();
    m.push_grouped(route("/api/"));
    m.push_grouped(route("/api/users"));
    m.push_grouped(route("/api/orders"));
    m.push_grouped(route("/static/"));
    m.push_grouped(route("/static/app.js"));

    let api: Vec<&str> = m.group_of(&"/api/").map(|r| r.path).collect();
    assert_eq!(api, ["/api/users", "/api/orders"]);
    let st: Vec<&str> = m.group_of(&"/static/").map(|r| r.path).collect();
    assert_eq!(st, ["/static/app.js"]);
    assert_eq!(m.entry(0).and_then(|e| e.group_tail()), Some(2));
    assert!(!m.entry(1).unwrap().is_head());
    assert_eq!(m.group_of(&"/missing").len(), 0);
}

// Test: a member added after an unrelated head.
// Assumes: the grouping contract is only positional.
// Verifies: the late member starts its own group instead of joining /api/.
#[test]
fn late_member_does_not_rejoin() {
    let mut m = KeyedMap::new();
    m.push_grouped(route("/api/"));
    m.push_grouped(route("/api/a"));
    m.push_grouped(route("/img/"));
    m.push_grouped(route("/api/b"));
    assert_eq!(m.group_of(&"/api/").len(), 1);
    assert!(m.entry(3).unwrap().is_head());
}

// Test: thousands of grouped inserts starting from the smallest table.
// Verifies: lookups, order and groups all survive repeated growth.
#[test]
fn growth_preserves_everything() {
    let mut m: KeyedMap<String, usize> = KeyedMap::with_capacity(1);
    for i in 0..5_000 {
        m.insert(format!("k{i}"), i);
    }
    assert_eq!(m.len(), 5_000);
    assert!(m.capacity() >= 10_000);
    for i in (0..5_000).step_by(97) {
        assert_eq!(m.get(format!("k{i}").as_str()), Some(&i));
        assert_eq!(m[i].value(), &i);
    }
    assert!(m.values().copied().eq(0..5_000));
}

#[test]
fn scans_and_clear() {
    let mut m: KeyedMap<u32, u32> = (1..=10).map(|i| (i, i * i)).collect();
    let even = |v: &u32| v % 2 == 0;
    assert_eq!(m.all(Some(&even)), [&4, &16, &36, &64, &100]);
    assert_eq!(m.all(None).len(), 10);
    assert_eq!(m.find(Some(&|v: &u32| *v > 50)), Some(&64));
    let mut seen = Vec::new();
    m.for_each(Some(&|k: &u32, _: &u32| *k > 8), |k, v| seen.push((*k, *v)));
    assert_eq!(seen, [(9, 81), (10, 100)]);

    let cap = m.capacity();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.capacity(), cap);
    assert_eq!(m.get(&3), None);
    m.insert(3, 0);
    assert_eq!(m.index_of(&3), Some(0));
}

#[test]
#[should_panic(expected = "out of range")]
fn index_past_len_panics() {
    let m: KeyedMap<u8, u8> = [(1, 1)].into_iter().collect();
    let _ = &m[1];
}
