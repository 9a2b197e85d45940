//! Decode sessions.
//!
//! A [`Session`] owns one arena. Every document decoded through it lives in
//! that arena and is borrowed from the session, so the borrow checker keeps
//! nodes from outliving teardown.

pub mod tokenizer;

use std::cell::RefCell;
use std::fmt;

use tracing::debug;

use crate::arena::{Arena, ArenaStats, SlabHeap, SystemHeap};
use crate::build::DomBuilder;
use crate::dom::NodeRef;
use crate::options::HeapConfig;
use crate::{Error, Result};

pub use tokenizer::{JsonTokenizer, Tokenizer};

pub struct Session<'buf, H: SlabHeap = SystemHeap> {
    arena: Arena<'buf, H>,
    error: RefCell<Option<String>>,
}

impl Session<'static, SystemHeap> {
    /// A session on the system heap with a default-sized first slab.
    pub fn new() -> Self {
        Self::with_arena(Arena::new())
    }
}

impl Default for Session<'static, SystemHeap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'buf, H: SlabHeap> Session<'buf, H> {
    /// Fails when a caller buffer is configured that cannot hold the first
    /// slab header and a root node, or when the first owned slab cannot be
    /// reserved.
    pub fn with_config(config: HeapConfig<'buf, H>) -> Result<Self> {
        let HeapConfig {
            initial_buffer,
            initial_capacity,
            heap,
        } = config;
        let arena: Arena<'buf, H> = match initial_buffer {
            Some(buffer) => Arena::from_buffer_in(buffer, heap)?,
            None => Arena::try_with_capacity_in(initial_capacity, heap)?,
        };
        Ok(Self::with_arena(arena))
    }

    pub fn with_arena(arena: Arena<'buf, H>) -> Self {
        Self {
            arena,
            error: RefCell::new(None),
        }
    }

    /// Decodes JSON text into the session arena.
    pub fn decode(&self, input: &[u8]) -> Result<NodeRef<'_>> {
        self.decode_with(&mut JsonTokenizer, input)
    }

    /// Decodes `input` with a caller-chosen tokenizer. On failure the
    /// tokenizer's message is returned and also kept for [`Session::error`];
    /// nodes built before the failure stay in the arena until teardown.
    pub fn decode_with<T: Tokenizer>(&self, tokenizer: &mut T, input: &[u8]) -> Result<NodeRef<'_>> {
        let mut builder = DomBuilder::new(&self.arena);
        let outcome = tokenizer.tokenize(input, &mut builder);
        let built = builder.stats();
        match outcome {
            Ok(root) => {
                debug!(
                    bytes = input.len(),
                    nodes = built.nodes,
                    cells = built.cells,
                    root = %root.kind(),
                    "decoded document"
                );
                self.error.replace(None);
                Ok(root)
            }
            Err(message) => {
                debug!(
                    bytes = input.len(),
                    nodes = built.nodes,
                    error = %message,
                    "decode failed"
                );
                self.error.replace(Some(message.clone()));
                Err(Error::tokenize(message))
            }
        }
    }

    /// Message of the last failed decode, if the last decode failed.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn arena(&self) -> &Arena<'buf, H> {
        &self.arena
    }

    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Tears the session down, freeing every slab the arena owns.
    pub fn release(self) {
        let Session { arena, error } = self;
        debug!(failed = error.borrow().is_some(), "releasing session");
        arena.release();
    }
}

impl<H: SlabHeap> fmt::Debug for Session<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("arena", &self.arena)
            .field("error", &self.error.borrow())
            .finish()
    }
}

/// Decodes JSON text into a caller-owned arena.
pub fn decode_in<'a, H: SlabHeap>(arena: &'a Arena<'_, H>, input: &[u8]) -> Result<NodeRef<'a>> {
    let mut builder = DomBuilder::new(arena);
    JsonTokenizer
        .tokenize(input, &mut builder)
        .map_err(Error::tokenize)
}
