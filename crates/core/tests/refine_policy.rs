use gadget_core::model::{Gadget, GadgetSet};
use gadget_core::services::refine;

fn sample_set() -> GadgetSet {
    vec![
        Gadget::new(0x4f2c5, ["rsp & 0xf == 0", "rcx == NULL"]),
        Gadget::new(0x4f322, ["[rsp+0x40] == NULL"]),
        Gadget::new(0x10a38c, ["[rsp+0x70] == NULL"]),
        Gadget::new(0xe569f, ["r14 == NULL", "r12 == NULL", "rbp-0x38 is writable"]),
    ]
}

#[test]
fn level_zero_keeps_only_minimum_constraint_count() {
    let input = sample_set();
    let best = input.iter().map(|g| g.constraints().len()).min().unwrap();

    let refined = refine(input.clone(), 0);

    assert!(!refined.is_empty());
    assert!(refined.iter().all(|g| g.constraints().len() == best));
    // Every input gadget at the minimum survives.
    let expected: Vec<_> =
        input.iter().filter(|g| g.constraints().len() == best).cloned().collect();
    assert_eq!(refined, expected);
    assert_eq!(refined.iter().map(Gadget::offset).collect::<Vec<_>>(), vec![0x4f322, 0x10a38c]);
}

#[test]
fn positive_levels_pass_through_unchanged() {
    for level in [1, 2, 17, i32::MAX] {
        assert_eq!(refine(sample_set(), level), sample_set(), "level {level}");
    }
}

#[test]
fn empty_input_stays_empty_at_every_level() {
    for level in [i32::MIN, -1, 0, 1, 5] {
        assert!(refine(Vec::new(), level).is_empty(), "level {level}");
    }
}

#[test]
fn single_gadget_always_survives() {
    let set = vec![Gadget::new(0x1234, ["a", "b", "c"])];
    assert_eq!(refine(set.clone(), 0), set);
}

#[test]
fn unconstrained_gadgets_win_over_everything_else() {
    let set = vec![
        Gadget::new(1, ["x"]),
        Gadget::new(2, Vec::<String>::new()),
        Gadget::new(3, ["y", "z"]),
        Gadget::new(4, Vec::<String>::new()),
    ];
    let offsets: Vec<u64> = refine(set, 0).iter().map(Gadget::offset).collect();
    assert_eq!(offsets, vec![2, 4]);
}
