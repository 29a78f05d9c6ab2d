use super::{Module, Value};
use crate::error::{Error, Result};

/// Applies every held module to the same arguments and collects the outputs.
///
/// Outputs come back in construction order, one per module. Modules run one
/// after another on the calling thread; the first error aborts the call.
#[derive(Debug)]
pub struct ListOutModule {
    modules: Vec<Box<dyn Module>>,
}

impl ListOutModule {
    /// Takes ownership of an ordered, non-empty list of modules.
    ///
    /// # Errors
    /// [`Error::EmptyInput`] if `modules` is empty.
    pub fn new(modules: Vec<Box<dyn Module>>) -> Result<Self> {
        if modules.is_empty() {
            return Err(Error::EmptyInput { op: "list_out" });
        }
        Ok(Self { modules })
    }

    /// Number of held modules, which is also the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Always `false`; construction rejects an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates over the held modules in output order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Module> {
        self.modules.iter().map(|m| &**m)
    }

    /// Runs each module on `args` and returns the outputs as a `Vec`.
    pub fn forward_each(&self, args: &[Value]) -> Result<Vec<Value>> {
        self.modules.iter().map(|m| m.forward(args)).collect()
    }
}

impl Module for ListOutModule {
    fn forward(&self, args: &[Value]) -> Result<Value> {
        self.forward_each(args).map(Value::List)
    }
}
