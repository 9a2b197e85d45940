pub mod arena;
pub mod build;
pub mod decode;
pub mod dom;
pub mod error;
pub mod num;
pub mod options;
pub mod unpack;

pub use crate::arena::{Arena, ArenaStats, SlabHeap, SystemHeap, DEFAULT_INITIAL_HEAP, MIN_INITIAL_HEAP};
pub use crate::build::{BuildStats, Builder, DomBuilder};
pub use crate::decode::{decode_in, JsonTokenizer, Session, Tokenizer};
pub use crate::dom::{ArrayIter, ArrayNode, JsonStr, Kind, Node, NodeRef, ObjectIter, ObjectNode};
pub use crate::error::{Error, ErrorKind, ErrorStage};
pub use crate::options::HeapConfig;
pub use crate::unpack::{
    parse_format, unpack, unpack_format, Expected, Field, TypeCode, MAX_UNPACK_KEYS,
};

pub type Result<T> = std::result::Result<T, Error>;
