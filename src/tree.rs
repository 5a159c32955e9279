//! Decision trees
//!
//! [`node`] defines the tree model, [`expander`] builds trees from productions
//! and [`walk`] flattens them for consumers that want a linear step list.

pub mod expander;
pub mod node;
pub mod walk;

pub use expander::{Expander, Truncation, TruncationReason};
pub use node::{ChoiceNode, DecisionNode, FieldNode, FieldType, OptionEdge, SequenceNode};
pub use walk::ParameterStep;
