extern crate haplotype_cluster;

use haplotype_cluster::interval_tree::IntervalTree;

#[test]
fn range_iter_returns_every_overlapping_interval() {
    let mut tree = IntervalTree::new();
    let handles: Vec<_> = [(1, 5), (10, 20), (15, 16), (30, 40), (3, 3)]
        .iter()
        .map(|&(s, e)| tree.add(s, e, (s, e)))
        .collect();
    tree.check_invariants().expect("invariants hold after inserts");

    let mut found: Vec<(i64, i64)> = tree.range_iter(4, 16).map(|h| tree.key(h)).collect();
    found.sort();
    assert_eq!(found, vec![(1, 5), (10, 20), (15, 16)]);

    // Non-overlapping query returns nothing.
    assert_eq!(tree.range_iter(21, 29).count(), 0);

    // Deleting a handle removes it from later queries without disturbing
    // the others.
    tree.del(handles[1]);
    tree.check_invariants().expect("invariants hold after delete");
    let mut remaining: Vec<(i64, i64)> = tree.range_iter(i64::MIN, i64::MAX).map(|h| tree.key(h)).collect();
    remaining.sort();
    assert_eq!(remaining, vec![(1, 5), (3, 3), (15, 16), (30, 40)]);
}

#[test]
fn last_augmentation_stays_consistent_through_many_mutations() {
    let mut tree = IntervalTree::new();
    let mut live = Vec::new();

    let inserts = [
        (0, 10),
        (5, 7),
        (-3, 2),
        (8, 50),
        (20, 21),
        (100, 100),
        (-100, -50),
        (9, 9),
    ];
    for &(s, e) in &inserts {
        live.push(tree.add(s, e, (s, e)));
        tree.check_invariants().unwrap();
    }

    // Delete every other one, re-checking invariants after each removal.
    for (i, &handle) in live.iter().enumerate() {
        if i % 2 == 0 {
            tree.del(handle);
            tree.check_invariants().unwrap();
        }
    }
}

#[test]
fn get_pair_mut_borrows_two_distinct_handles() {
    let mut tree = IntervalTree::new();
    let a = tree.add(0, 5, 1u32);
    let b = tree.add(10, 15, 2u32);

    {
        let (pa, pb) = tree.get_pair_mut(a, b);
        *pa += 10;
        *pb += 20;
    }

    assert_eq!(*tree.get(a).unwrap(), 11);
    assert_eq!(*tree.get(b).unwrap(), 22);
}

#[test]
#[should_panic]
fn get_pair_mut_rejects_equal_handles() {
    let mut tree = IntervalTree::new();
    let a = tree.add(0, 5, 1u32);
    tree.get_pair_mut(a, a);
}

#[test]
fn del_on_node_with_two_children_splices_successor_correctly() {
    let mut tree = IntervalTree::new();
    let root = tree.add(50, 50, "root");
    let _left = tree.add(20, 20, "left");
    let _right = tree.add(80, 80, "right");
    let _right_left = tree.add(70, 70, "right-left");
    let _right_right = tree.add(90, 90, "right-right");

    tree.del(root);
    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 4);

    let remaining: Vec<(i64, i64)> = tree.range_iter(i64::MIN, i64::MAX).map(|h| tree.key(h)).collect();
    assert_eq!(remaining.len(), 4);
}
