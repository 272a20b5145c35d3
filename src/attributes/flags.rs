//! Set-overlap kinds: tags, execution flags and interface bits.

use crate::engine::attribute::{Attribute, downcast_attribute};
use crate::engine::object::{ExecFlag, Interfaces, TagName, WarehouseObject};


/// Tags an object participates in. Matches if any probed tag is stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribTags {
    tags: Vec<TagName>,
}

impl AttribTags {
    /// Tag set, deduplicated and sorted.
    pub fn new<S: Into<TagName>>(tags: impl IntoIterator<Item = S>) -> Self {
        let mut tags: Vec<TagName> = tags.into_iter().map(Into::into).collect();
        tags.sort_unstable();
        tags.dedup();
        Self { tags }
    }

    /// Probe for a single tag.
    pub fn one(tag: impl Into<TagName>) -> Self { Self { tags: vec![tag.into()] } }

    /// Tags held, ascending.
    pub fn tags(&self) -> &[TagName] { &self.tags }
}

impl Attribute for AttribTags {
    value_attribute!(AttribTags);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        *self = Self::new(object.tags().unwrap_or_default());
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool {
        downcast_attribute::<Self>(probe).is_some_and(|p| {
            p.tags.iter().any(|t| self.tags.binary_search(t).is_ok())
        })
    }
}

/// Execution points an object runs at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribExecOn {
    flags: Vec<ExecFlag>,
}

impl AttribExecOn {
    /// Probe for objects running at `flag`.
    pub fn probe(flag: ExecFlag) -> Self { Self { flags: vec![flag] } }

    /// A stored flag set.
    pub fn stored(flags: impl IntoIterator<Item = ExecFlag>) -> Self {
        let mut flags: Vec<ExecFlag> = flags.into_iter().collect();
        flags.sort_unstable();
        flags.dedup();
        Self { flags }
    }

    /// Flags held, ascending.
    pub fn flags(&self) -> &[ExecFlag] { &self.flags }
}

impl Attribute for AttribExecOn {
    value_attribute!(AttribExecOn);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        *self = Self::stored(object.execute_on().unwrap_or_default());
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool {
        let Some(&wanted) = downcast_attribute::<Self>(probe).and_then(|p| p.flags.first()) else {
            return false;
        };
        self.flags.binary_search(&wanted).is_ok() || self.flags.binary_search(&ExecFlag::Always).is_ok()
    }
}

/// Interfaces an object implements. Matches on any shared bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttribInterfaces {
    bits: Interfaces,
}

impl AttribInterfaces {
    /// Probe or stored value over `bits`.
    pub fn new(bits: Interfaces) -> Self { Self { bits } }

    /// The interface bits.
    pub fn bits(&self) -> Interfaces { self.bits }
}

impl Attribute for AttribInterfaces {
    value_attribute!(AttribInterfaces);

    fn init_from(&mut self, object: &dyn WarehouseObject, _system: &str) {
        self.bits = object.interfaces();
    }

    fn is_match(&self, probe: &dyn Attribute) -> bool {
        downcast_attribute::<Self>(probe).is_some_and(|p| self.bits.intersects(p.bits))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    struct Pp;

    impl WarehouseObject for Pp {
        fn name(&self) -> &str { "pp" }
        fn tags(&self) -> Option<Vec<TagName>> { Some(vec!["residual".into(), "jacobian".into()]) }
        fn execute_on(&self) -> Option<Vec<ExecFlag>> { Some(vec![ExecFlag::TimestepEnd, ExecFlag::Initial]) }
        fn interfaces(&self) -> Interfaces { Interfaces::POSTPROCESSOR | Interfaces::ELEMENT }
    }

    #[test]
    fn tags_match_on_any_overlap() {
        let mut stored = AttribTags::default();
        stored.init_from(&Pp, "nl");
        assert!(stored.is_match(&AttribTags::one("jacobian")));
        assert!(stored.is_match(&AttribTags::new(["time", "residual"])));
        assert!(!stored.is_match(&AttribTags::new(["time"])));
        assert!(!stored.is_match(&AttribTags::default()));
    }

    #[test]
    fn exec_on_honors_always() {
        let mut stored = AttribExecOn::default();
        stored.init_from(&Pp, "nl");
        assert_eq!(stored.flags(), &[ExecFlag::Initial, ExecFlag::TimestepEnd]);
        assert!(stored.is_match(&AttribExecOn::probe(ExecFlag::Initial)));
        assert!(!stored.is_match(&AttribExecOn::probe(ExecFlag::Linear)));

        let always = AttribExecOn::stored([ExecFlag::Always]);
        assert!(always.is_match(&AttribExecOn::probe(ExecFlag::Linear)));
    }

    #[test]
    fn interfaces_match_on_shared_bits() {
        let mut stored = AttribInterfaces::default();
        stored.init_from(&Pp, "nl");
        assert!(stored.is_match(&AttribInterfaces::new(Interfaces::ELEMENT | Interfaces::SIDE)));
        assert!(!stored.is_match(&AttribInterfaces::new(Interfaces::NODAL)));
        assert!(!stored.is_match(&AttribInterfaces::new(Interfaces::empty())));
    }
}
