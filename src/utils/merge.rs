/// Applies a partially populated override record on top of a fully populated base record,
/// leaf field by leaf field.
pub trait Overlay<Base> {
    fn overlay(&self, base: &Base) -> Base;
}

/// Returns the override when present, the base value otherwise.
pub fn pick<T: Clone>(over: &Option<T>, base: &T) -> T {
    match over {
        Some(value) => value.clone(),
        None => base.clone(),
    }
}

/// Same as [`pick`] for fields whose base value may itself be absent.
pub fn pick_optional<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
    over.as_ref().or_else(|| base.as_ref()).cloned()
}

/// Lists are replaced wholesale: any override entry discards every base entry.
pub fn pick_list<T: Clone>(over: &[T], base: &[T]) -> Vec<T> {
    if over.is_empty() {
        base.to_vec()
    } else {
        over.to_vec()
    }
}

/// Optional nested groups: a group present on only one side is taken as is, a group present on
/// both sides is merged leaf by leaf.
pub fn pick_group<T: Overlay<T> + Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
    match (over, base) {
        (Some(over), Some(base)) => Some(over.overlay(base)),
        (Some(over), None) => Some(over.clone()),
        (None, base) => base.clone(),
    }
}
