//! Local variable slot allocation
//!
//! One table per routine. Slot 0 holds the receiver of an instance method or
//! the argument array of the entry routine; parameters follow in order, then
//! locals in declaration order. Every MiniJ value takes a single slot.

use std::collections::HashMap;

use crate::ast::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVar {
    pub slot: u16,
    pub ty: Type,
}

#[derive(Debug, Default)]
pub struct LocalTable {
    vars: HashMap<String, LocalVar>,
    /// Next available slot
    nextreg: u16,
    /// One past the highest slot touched
    max_locals: u16,
}

impl LocalTable {
    /// Table for an instance routine: slot 0 is `this`
    pub fn for_instance() -> Self {
        Self::with_reserved(1)
    }

    /// Table for the static entry routine; its parameter is declared explicitly
    pub fn for_static() -> Self {
        Self::with_reserved(0)
    }

    fn with_reserved(nextreg: u16) -> Self {
        Self {
            vars: HashMap::new(),
            nextreg,
            max_locals: nextreg,
        }
    }

    /// Bind `name` to the next free slot. A name already bound keeps its slot.
    pub fn allocate(&mut self, name: &str, ty: Type) -> u16 {
        if let Some(existing) = self.vars.get(name) {
            return existing.slot;
        }
        let slot = self.nextreg;
        self.nextreg = self.nextreg.saturating_add(1);
        self.max_locals = self.max_locals.max(self.nextreg);
        self.vars.insert(name.to_string(), LocalVar { slot, ty });
        slot
    }

    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.vars.get(name)
    }

    /// Record use of a slot that no declaration owns
    pub fn touch(&mut self, slot: u16) {
        self.max_locals = self.max_locals.max(slot.saturating_add(1));
    }

    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_slots_start_after_this() {
        let mut locals = LocalTable::for_instance();
        assert_eq!(locals.allocate("num", Type::Int), 1);
        assert_eq!(locals.allocate("aux", Type::IntArray), 2);
        assert_eq!(locals.allocate("num", Type::Int), 1);
        assert_eq!(locals.get("aux").map(|v| v.ty.clone()), Some(Type::IntArray));
        assert_eq!(locals.max_locals(), 3);
    }

    #[test]
    fn static_slots_start_at_zero() {
        let mut locals = LocalTable::for_static();
        assert_eq!(locals.max_locals(), 0);
        assert_eq!(locals.allocate("args", Type::class("String[]")), 0);
        assert_eq!(locals.allocate("x", Type::Int), 1);
        locals.touch(4);
        assert_eq!(locals.max_locals(), 5);
    }
}
