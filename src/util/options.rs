use std::default::Default;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Post-allocation policy of the reference counting plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString, Display)]
pub enum RcFlavor {
    /// New objects carry the `NEW` bit and are scanned the first time they are referenced.
    Base,
    /// New objects are born logged and pushed to the modified-object buffer, so every new
    /// object is scanned at the next increment.
    Generational,
}

/// Power of two, at least 1.
fn is_power_of_two(v: &usize) -> bool {
    v.is_power_of_two()
}

fn always_valid<T>(_: &T) -> bool {
    true
}

macro_rules! options {
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*,) => [
        options!($($(#[$outer])* $name: $type[$validator] = $default),*);
    ];
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*) => [
        /// Configuration of an RC instance. Options are set on [`crate::MMTKBuilder`] and are
        /// immutable once the instance is built.
        #[derive(Clone, Debug)]
        pub struct Options {
            $($(#[$outer])* pub $name: $type),*
        }
        impl Options {
            /// Set an option from its snake case name and a string value. Returns false if the
            /// key is unknown, or the value cannot be parsed or does not pass validation.
            pub fn set_from_str(&mut self, s: &str, val: &str) -> bool {
                match s {
                    $(stringify!($name) => if let Ok(ref val) = <$type>::from_str(val) {
                        let validate_fn = $validator;
                        let is_valid = validate_fn(val);
                        if is_valid {
                            self.$name = val.clone();
                        } else {
                            warn!("Unable to set {}={:?}. Invalid value. Default value will be used.", s, val);
                        }
                        is_valid
                    } else {
                        warn!("Unable to set {}={:?}. Can't parse value. Default value will be used.", s, val);
                        false
                    })*
                    _ => {
                        warn!("Unknown option {}", s);
                        false
                    }
                }
            }

            /// Read options from environment variables prefixed with `MMTK_`, such as
            /// `MMTK_ARRAY_QUANTUM=4`.
            pub fn read_env_var_settings(&mut self) {
                const PREFIX: &str = "MMTK_";
                for (key, val) in std::env::vars() {
                    if let Some(rest_of_key) = key.strip_prefix(PREFIX) {
                        let lowercase: &str = &rest_of_key.to_lowercase();
                        match lowercase {
                            $(stringify!($name) => { self.set_from_str(lowercase, &val); },)*
                            _ => {}
                        }
                    }
                }
            }
        }
        impl Default for Options {
            fn default() -> Self {
                Options {
                    $($name: $default),*
                }
            }
        }
    ]
}

options! {
    /// Post-allocation policy.
    rc_flavor:                       RcFlavor [always_valid] = RcFlavor::Base,
    /// Use the field barrier for stores into scalar fields.
    field_barrier_for_putfield:      bool     [always_valid] = false,
    /// Use the field barrier for stores into reference arrays.
    field_barrier_for_aastore:       bool     [always_valid] = false,
    /// Arrays shorter than this use the object barrier even with `field_barrier_for_aastore`.
    field_barrier_aastore_threshold: usize    [always_valid] = 0,
    /// Number of adjacent array elements covered by one field mark.
    array_quantum:                   usize    [is_power_of_two] = 1,
    /// Emit the scalar field barrier check out of line.
    putfield_barrier_out_of_line:    bool     [always_valid] = false,
    /// Emit the array field barrier check out of line.
    aastore_barrier_out_of_line:     bool     [always_valid] = false,
    /// Entries a thread-local buffer holds before it spills into the global pool.
    buffer_capacity:                 usize    [|v: &usize| *v > 0] = 4096,
    /// Number of collector contexts.
    threads:                         usize    [|v: &usize| *v > 0] = num_cpus::get(),
    /// Elect cycle collection every N increments. 0 means only on request.
    cycle_collection_interval:       usize    [always_valid] = 0,
    /// Count barrier fast and slow path events.
    barrier_stats:                   bool     [always_valid] = false,
    /// Verbose tracing of field barrier logging and large object frees.
    verbose:                         bool     [always_valid] = false,
}

impl Options {
    /// Set an option from a camel case name, as used by some hosts (e.g. `arrayQuantum`).
    pub fn set_from_camelcase_str(&mut self, s: &str, val: &str) -> bool {
        trace!("Trying to process option pair: ({}, {})", s, val);

        let mut sr = String::with_capacity(s.len());
        for c in s.chars() {
            if c.is_uppercase() {
                sr.push('_');
                for c in c.to_lowercase() {
                    sr.push(c);
                }
            } else {
                sr.push(c)
            }
        }

        let result = self.set_from_str(sr.as_str(), val);
        if result {
            trace!("Validation passed");
        } else {
            trace!("Validation failed")
        }
        result
    }

    /// log2 of the array quantum.
    pub fn log_array_quantum(&self) -> usize {
        self.array_quantum.trailing_zeros() as usize
    }

    /// Is any field barrier enabled?
    pub fn field_barrier(&self) -> bool {
        self.field_barrier_for_putfield || self.field_barrier_for_aastore
    }
}
