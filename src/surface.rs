use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binding::BindingTable;

/// Host document the binder reads controls from and writes readouts to.
pub trait ControlSurface {
    fn has_control(&self, id: &str) -> bool;
    fn set_readout(&self, id: &str, text: &str);
}

/// Headless surface that records readout text in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    controls: HashSet<String>,
    readouts: RwLock<HashMap<String, String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controls<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            controls: ids.into_iter().map(Into::into).collect(),
            readouts: RwLock::default(),
        }
    }

    /// Surface containing every control and readout label of `table`.
    pub fn for_table(table: &BindingTable) -> Self {
        Self::with_controls(
            table
                .iter()
                .flat_map(|spec| std::iter::once(&spec.control).chain(spec.readout.as_ref()))
                .cloned(),
        )
    }

    pub fn remove_control(&mut self, id: &str) -> bool {
        self.controls.remove(id)
    }

    pub fn readout(&self, id: &str) -> Option<String> {
        self.readouts.read().get(id).cloned()
    }
}

impl ControlSurface for MemorySurface {
    fn has_control(&self, id: &str) -> bool {
        self.controls.contains(id)
    }

    fn set_readout(&self, id: &str, text: &str) {
        self.readouts.write().insert(id.to_string(), text.to_string());
    }
}

impl<T> ControlSurface for Arc<T>
where
    T: ControlSurface + ?Sized,
{
    fn has_control(&self, id: &str) -> bool {
        (**self).has_control(id)
    }

    fn set_readout(&self, id: &str, text: &str) {
        (**self).set_readout(id, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_surface_includes_readouts() {
        let surface = MemorySurface::for_table(&BindingTable::standard());
        assert!(surface.has_control("c1-x-scale"));
        assert!(surface.has_control("c1-x-scale-value"));
        assert!(surface.has_control("c3-ka-value"));
        assert!(!surface.has_control("c4-x-scale"));
    }

    #[test]
    fn readouts_are_recorded() {
        let surface = Arc::new(MemorySurface::with_controls(["label"]));
        surface.set_readout("label", "0.5");
        assert_eq!(surface.readout("label").as_deref(), Some("0.5"));
        assert_eq!(surface.readout("other"), None);
    }
}
