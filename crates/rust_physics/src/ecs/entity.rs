//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Generational key: a destroyed entity's identifier is never reported
    /// as alive again, even if its slot is reused.
    pub struct Entity;
}
