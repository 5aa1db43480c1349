//! Knowledge graph access
//!
//! - `port`: the narrow read port used by the view layer
//! - `store`, `node`, `edge`, `property`, `types`: an in-memory property graph
//! - `memory`: the embedded read-port implementation over that graph
//! - `seed`: fixture loading

pub mod edge;
pub mod memory;
pub mod node;
pub mod port;
pub mod property;
pub mod seed;
pub mod store;
pub mod types;

pub use edge::Edge;
pub use memory::MemoryGraph;
pub use node::Node;
pub use port::{GraphReader, ReadError, ReadQuery, ReadResult, Row};
pub use property::{PropertyMap, PropertyValue};
pub use seed::{SeedError, SeedGraph};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
