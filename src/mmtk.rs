//! MMTk instance.

use std::sync::Arc;

use crate::global_state::GlobalState;
use crate::plan::rc::RC;
use crate::util::heap::PageResource;
use crate::util::options::Options;
use crate::util::statistics::BarrierStats;
use crate::vm::VMBinding;

/// MMTk builder. This is used to set options and other settings before actually creating an
/// MMTk instance.
pub struct MMTKBuilder {
    /// The options for this instance.
    pub options: Options,
}

impl MMTKBuilder {
    /// Create an MMTK builder with options read from environment variables, or using built-in
    /// default if not overridden by environment variables.
    pub fn new() -> Self {
        let mut builder = Self::new_no_env_vars();
        builder.options.read_env_var_settings();
        builder
    }

    /// Create an MMTK builder with build-in default options, but without reading options from
    /// environment variables.
    pub fn new_no_env_vars() -> Self {
        MMTKBuilder {
            options: Options::default(),
        }
    }

    /// Set an option. Returns false if the name is unknown or the value is invalid.
    pub fn set_option(&mut self, name: &str, val: &str) -> bool {
        self.options.set_from_str(name, val)
    }

    /// Build an MMTk instance from the builder.
    pub fn build<VM: VMBinding>(&self, resources: HeapResources) -> MMTK<VM> {
        MMTK::new(Arc::new(self.options.clone()), resources)
    }
}

impl Default for MMTKBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The memory the host gives to each space. Each page resource covers a disjoint address
/// range.
pub struct HeapResources {
    pub rc: Box<dyn PageResource>,
    pub los: Box<dyn PageResource>,
    pub immortal: Box<dyn PageResource>,
}

/// An MMTk instance. MMTk allows multiple instances to run independently, and each instance
/// gives users a separate heap.
/// *Note that multi-instances is not fully supported yet*
pub struct MMTK<VM: VMBinding> {
    pub(crate) options: Arc<Options>,
    pub(crate) plan: RC<VM>,
    pub(crate) state: GlobalState,
    pub(crate) barrier_stats: Arc<BarrierStats>,
}

impl<VM: VMBinding> MMTK<VM> {
    pub fn new(options: Arc<Options>, resources: HeapResources) -> Self {
        let barrier_stats = Arc::new(BarrierStats::new(options.barrier_stats));
        let plan = RC::new(options.clone(), resources);
        MMTK {
            options,
            plan,
            state: GlobalState::default(),
            barrier_stats,
        }
    }

    pub fn get_options(&self) -> &Options {
        &self.options
    }

    pub fn get_plan(&self) -> &RC<VM> {
        &self.plan
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    /// Pages currently reserved by all spaces.
    pub fn get_reserved_pages(&self) -> usize {
        self.plan.get_reserved_pages()
    }
}
