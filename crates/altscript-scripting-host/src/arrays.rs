use altscript_events::Value;
use tracing::warn;

use crate::engine::{ScriptModule, TypeInfo};
use crate::handle::Pinned;
use crate::marshal::{ArrayKind, ObjectRef};

/// Array type descriptors pinned for the lifetime of a started resource
#[derive(Debug, Default)]
pub struct ArrayTypes {
    string: Option<Pinned<dyn TypeInfo>>,
    int: Option<Pinned<dyn TypeInfo>>,
    uint: Option<Pinned<dyn TypeInfo>>,
    any: Option<Pinned<dyn TypeInfo>>,
}

impl ArrayTypes {
    /// Look up every array type in `module` and take a reference to each
    pub fn resolve(module: &dyn ScriptModule) -> Self {
        let mut types = Self::default();
        for kind in ArrayKind::ALL {
            match module.type_info_by_decl(kind.declaration()) {
                Some(type_info) => *types.slot_mut(kind) = Some(Pinned::acquire(type_info)),
                None => warn!(
                    target: "scripting",
                    "Type {} not found in module {}",
                    kind.declaration(),
                    module.name()
                ),
            }
        }
        types
    }

    fn slot_mut(&mut self, kind: ArrayKind) -> &mut Option<Pinned<dyn TypeInfo>> {
        match kind {
            ArrayKind::String => &mut self.string,
            ArrayKind::Int => &mut self.int,
            ArrayKind::UInt => &mut self.uint,
            ArrayKind::Any => &mut self.any,
        }
    }

    pub fn get(&self, kind: ArrayKind) -> Option<&Pinned<dyn TypeInfo>> {
        match kind {
            ArrayKind::String => self.string.as_ref(),
            ArrayKind::Int => self.int.as_ref(),
            ArrayKind::UInt => self.uint.as_ref(),
            ArrayKind::Any => self.any.as_ref(),
        }
    }

    pub fn resolved_count(&self) -> usize {
        ArrayKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }

    /// Create a script array, or a null handle if the type is unavailable
    pub fn create(&self, kind: ArrayKind, items: Vec<Value>) -> ObjectRef {
        let Some(type_info) = self.get(kind) else {
            warn!(
                target: "scripting",
                "Cannot create {}: type is not resolved",
                kind.declaration()
            );
            return ObjectRef::Null;
        };

        match type_info.create_array(items) {
            Ok(array) => array,
            Err(e) => {
                warn!(target: "scripting", "Failed to create {}: {}", kind.declaration(), e);
                ObjectRef::Null
            }
        }
    }

    pub fn create_strings(&self, items: &[String]) -> ObjectRef {
        self.create(
            ArrayKind::String,
            items.iter().cloned().map(Value::String).collect(),
        )
    }
}
