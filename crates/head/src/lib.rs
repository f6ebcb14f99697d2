//! Document-head state manager.
//!
//! Contributors declare head content (`PropBag` or declarative `Element`
//! children); the `HeadManager` keeps them in mount order, reduces them into
//! one `HeadState` and either captures it for server rendering or applies it
//! to a live `html::Document`.

pub mod config;
pub mod declarative;
pub mod dom;
pub mod reduce;
pub mod registry;
pub mod scheduler;

mod attrs;
mod context;
mod manager;
mod props;
mod state;
mod tags;

pub use crate::attrs::{AttrList, AttrValue, Attributes, canonical_name};
pub use crate::config::{DedupRules, HeadConfig, IdentityRule};
pub use crate::context::{HeadContext, RenderScope, render_to_context};
pub use crate::declarative::{Child, ChildError, Element};
pub use crate::dom::{DomEmitter, EmitError, HeadChange};
pub use crate::manager::{Counters, HeadManager, Observer, Phase};
pub use crate::props::PropBag;
pub use crate::reduce::reduce;
pub use crate::registry::{ContributorInstance, InstanceId, InstanceRegistry};
pub use crate::scheduler::{Batched, Immediate, Scheduler};
pub use crate::state::{AttributeSlot, HeadState, SlotRef, TagSlot};
pub use crate::tags::{Aspect, TagDescriptor};
