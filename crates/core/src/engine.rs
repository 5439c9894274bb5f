//! Selection engine: one code per category, honoring locks, the action/place
//! compatibility constraint and the energy level filter.
//!
//! Pure functions over a [`Catalog`] snapshot. No IO, no state mutation; the
//! random source is passed in.

use std::collections::BTreeMap;

use rand::Rng;
use slotlove_storage::{Catalog, Category, CategoryMap, Code, MappingTable};

use crate::choice::weighted_choice;
use crate::{ACTION, ANY_LEVEL_PREFIX, ENERGY, LEVEL_PREFIX, PLACE};

/// Caller-supplied category -> code constraints.
pub type Locks = BTreeMap<Category, Code>;

/// One chosen code per category, `azione` and `luogo` first.
pub type Selection = CategoryMap<Code>;

/// A place is compatible with an action when it supports every capability
/// the action needs. Actions without needs fit anywhere.
pub fn is_compatible(mapping: &MappingTable, action: &str, place: &str) -> bool {
    let supports = mapping.supports(place);
    mapping
        .needs(action)
        .iter()
        .all(|need| supports.contains(need))
}

/// The places compatible with `action`, in list order.
pub fn compatible_places<'a>(mapping: &MappingTable, action: &str, places: &'a [Code]) -> Vec<&'a Code> {
    places
        .iter()
        .filter(|place| is_compatible(mapping, action, place))
        .collect()
}

/// Narrow the `energy` category to codes matching the difficulty level.
///
/// The last character of `level` selects codes prefixed `int_<char>`; codes
/// prefixed `int_any` always pass. Other categories, an empty level, or a
/// filter that matches nothing leave the list untouched.
pub fn filter_for_level<'a>(category: &str, codes: &'a [Code], level: &str) -> Vec<&'a Code> {
    let unfiltered = || codes.iter().collect::<Vec<_>>();
    if category != ENERGY {
        return unfiltered();
    }
    let Some(last) = level.chars().last() else {
        return unfiltered();
    };

    let prefix = format!("{LEVEL_PREFIX}{last}");
    let filtered: Vec<&Code> = codes
        .iter()
        .filter(|code| code.starts_with(&prefix) || code.starts_with(ANY_LEVEL_PREFIX))
        .collect();

    if filtered.is_empty() {
        unfiltered()
    } else {
        filtered
    }
}

/// A lock applies only when it names a member of the category's full list.
fn valid_lock<'a>(locked: &'a Locks, category: &str, codes: &[Code]) -> Option<&'a Code> {
    locked.get(category).filter(|code| codes.contains(code))
}

fn draw<T: AsRef<str>, R: Rng>(candidates: &[T], catalog: &Catalog, rng: &mut R) -> Code {
    weighted_choice(candidates, &catalog.scores, rng)
        .map(|code| code.as_ref().to_string())
        .unwrap_or_default()
}

/// Produce a full selection.
///
/// Order is fixed: the action first, then a place compatible with it, then
/// every other category in document order. Categories with no candidates
/// yield the empty string.
pub fn spin<R: Rng>(catalog: &Catalog, locked: &Locks, level: &str, rng: &mut R) -> Selection {
    let options = &catalog.options;
    let mapping = &catalog.mapping;
    let mut selection = Selection::new();

    let actions = options.codes(ACTION);
    let action = match valid_lock(locked, ACTION, actions) {
        Some(code) => code.clone(),
        None => draw(actions, catalog, rng),
    };

    let places = options.codes(PLACE);
    let compatible = compatible_places(mapping, &action, places);
    let place = match valid_lock(locked, PLACE, places) {
        Some(code) if is_compatible(mapping, &action, code) => code.clone(),
        Some(_) => compatible
            .first()
            .copied()
            .or(places.first())
            .cloned()
            .unwrap_or_default(),
        None if compatible.is_empty() => draw(places, catalog, rng),
        None => draw(&compatible, catalog, rng),
    };

    selection.insert(ACTION, action);
    selection.insert(PLACE, place);

    for (category, codes) in options.iter() {
        if category == ACTION || category == PLACE {
            continue;
        }
        let code = match valid_lock(locked, category, codes) {
            Some(code) => code.clone(),
            None => draw(&filter_for_level(category, codes, level), catalog, rng),
        };
        selection.insert(category, code);
    }

    selection
}

/// Unconstrained variant: an independent weighted draw per category in
/// document order, with no locks, compatibility or level filter.
pub fn quick_spin<R: Rng>(catalog: &Catalog, rng: &mut R) -> Selection {
    catalog
        .options
        .iter()
        .map(|(category, codes)| (category, draw(codes, catalog, rng)))
        .collect()
}
