//! Resolve Module - upstream variables of an automation node
//!
//! - `resolver`: `Resolver` / `resolve_variables`, `VariableEntry`
//! - `capability`: `CapabilityLookup` trait, YAML-backed `CapabilityRegistry`
//! - `observed`: `ObservedOutputs` trait, DashMap-backed `ObservedStore`
//! - `globals`: flow variables and masked secrets
//! - `friendly`: path → display name

mod capability;
mod friendly;
mod globals;
mod observed;
mod resolver;

pub use capability::{Capability, CapabilityLookup, CapabilityRegistry, OutputDecl};
pub use friendly::friendly_name;
pub use globals::{is_secret, GlobalPool, SECRET_MASK, SECRET_PREFIX};
pub use observed::{Observation, ObservedOutputs, ObservedStore};
pub use resolver::{resolve_variables, Resolver, VariableEntry, VariableScope, DEFAULT_PREVIEW_LEN};
