use crate::model::GadgetSet;

/// Narrow a gadget set according to `level`.
///
/// At `level <= 0` only the gadgets with the fewest constraints survive (all
/// of them on a tie, in input order). Any positive level returns the set
/// unchanged.
pub fn refine(gadgets: GadgetSet, level: i32) -> GadgetSet {
    if level > 0 {
        return gadgets;
    }
    let Some(best) = gadgets.iter().map(|g| g.constraints().len()).min() else {
        return gadgets;
    };
    gadgets.into_iter().filter(|g| g.constraints().len() == best).collect()
}
