use serde::{Deserialize, Serialize};
use util::IndexSet;

/// Opaque handle to a presentation resource.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub struct ResourceId(pub u32);

/// Lookup of presentation resources by key.
///
/// The engine asks for a handle when spawning something visible. A missing
/// handle means the spawn is skipped.
pub trait Assets {
    fn handle(&self, key: &str) -> Option<ResourceId>;
}

/// Simple asset registry that hands out handles in registration order.
#[derive(Clone, Default, Debug)]
pub struct AssetTable {
    keys: IndexSet<String>,
}

impl AssetTable {
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        AssetTable {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, key: impl Into<String>) -> ResourceId {
        let (i, _) = self.keys.insert_full(key.into());
        ResourceId(i as u32)
    }
}

impl Assets for AssetTable {
    fn handle(&self, key: &str) -> Option<ResourceId> {
        self.keys.get_index_of(key).map(|i| ResourceId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_stable() {
        let mut assets = AssetTable::new(["bolt", "orbital"]);
        assert_eq!(assets.handle("bolt"), Some(ResourceId(0)));
        assert_eq!(assets.handle("fireball"), None);
        assert_eq!(assets.register("fireball"), ResourceId(2));
        assert_eq!(assets.register("bolt"), ResourceId(0));
        assert_eq!(assets.handle(""), None);
    }
}
