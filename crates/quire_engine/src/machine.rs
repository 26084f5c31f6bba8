//! The machine that runs compiled handlers and builds nodes.
//!
//! A [`Machine`] owns the execution state, the memoization table and the
//! nodes finished so far. Compiled closures receive `&mut Machine` plus the
//! [`Frame`] of the handler invocation they belong to.
//!
//! Every room visit and every option resolution is forked: the state is
//! snapshotted before the handler runs and restored afterwards, so sibling
//! branches never observe each other's writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use quire_foundation::{
    DiceExpr, Error, ErrorKind, Facing, Host, Item, NativeFn, NodeId, Result, RoomId,
    SemanticLimit, Value, inventory_line,
};
use rand::RngCore;
use rand_chacha::ChaCha8Rng;

use crate::compiler::{CompiledOption, CompiledProgram, CompiledRoom};
use crate::config::EngineConfig;
use crate::memo::{ContentHash, NodeIndex, Origin};
use crate::node::{Choice, Node, NodeGraph, NodeNamer};
use crate::state::{Bindings, ExecutionState, RngState};

// =============================================================================
// Frames
// =============================================================================

/// How a statement finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Carry on with the next statement.
    Next,
    /// A `goto` ran: skip everything up to the handler boundary.
    Unwind,
}

/// A choice declared while a handler ran, resolved after its body finishes.
pub(crate) enum PendingChoice {
    Option {
        label: String,
        handler: Arc<CompiledOption>,
        captured: Bindings,
    },
    Direction {
        label: String,
        target: RoomId,
        facing: Option<Facing>,
    },
    StartOver {
        label: String,
    },
}

/// One invocation of a room or option handler.
pub struct Frame {
    /// The room whose bindings `room.x` refers to.
    pub room: RoomId,
    /// Local bindings, private to this invocation.
    pub locals: Bindings,
    text: Vec<String>,
    pending: Vec<PendingChoice>,
    continuation: Option<NodeId>,
}

impl Frame {
    /// Creates a frame for `room` starting with `locals`.
    #[must_use]
    pub fn new(room: RoomId, locals: Bindings) -> Self {
        Self {
            room,
            locals,
            text: Vec::new(),
            pending: Vec::new(),
            continuation: None,
        }
    }

    /// Appends a text segment. Blank segments are dropped.
    pub fn say(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.text.push(text);
        }
    }

    /// Text emitted so far.
    #[must_use]
    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub(crate) fn push_choice(&mut self, choice: PendingChoice) {
        self.pending.push(choice);
    }

    pub(crate) fn clear_choices(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn set_continuation(&mut self, node: NodeId) {
        self.continuation = Some(node);
    }
}

/// What a handler produced, before it is stored as a [`Node`].
struct NodeBody {
    text: String,
    children: Vec<Choice>,
    continuation: Option<NodeId>,
}

impl NodeBody {
    fn is_blank(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }
}

// =============================================================================
// Host
// =============================================================================

/// The [`Host`] handed to native functions: the current room's stream and
/// the reader's facing.
struct HostCtx<'a> {
    state: &'a mut ExecutionState,
    rng: ChaCha8Rng,
}

impl Host for HostCtx<'_> {
    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn facing(&self) -> Facing {
        self.state.facing()
    }

    fn set_facing(&mut self, facing: Facing) {
        self.state.set_facing(facing);
    }
}

// =============================================================================
// Machine
// =============================================================================

/// Counters describing a finished traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes materialized.
    pub nodes: usize,
    /// Memo lookups that reused a node.
    pub memo_hits: u64,
    /// Memo lookups that found nothing.
    pub memo_misses: u64,
}

/// Runs compiled handlers and collects the nodes they produce.
pub struct Machine {
    program: Arc<CompiledProgram>,
    state: ExecutionState,
    index: NodeIndex,
    nodes: BTreeMap<NodeId, Node>,
    names: NodeNamer,
    next_id: u32,
    entry: Option<NodeId>,
    /// Room nodes under construction since the last choice boundary. A
    /// `goto` landing on one of these would inline a page into itself.
    chain: Vec<NodeId>,
}

impl Machine {
    /// Creates a machine with a fresh execution state.
    #[must_use]
    pub fn new(program: Arc<CompiledProgram>, config: &EngineConfig) -> Self {
        let state = ExecutionState::new(program.rooms().len(), config);
        Self {
            program,
            state,
            index: NodeIndex::new(),
            nodes: BTreeMap::new(),
            names: NodeNamer::new(),
            next_id: 0,
            entry: None,
            chain: Vec::new(),
        }
    }

    /// The execution state.
    #[must_use]
    pub const fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Mutable access to the execution state.
    pub fn state_mut(&mut self) -> &mut ExecutionState {
        &mut self.state
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> TraversalStats {
        TraversalStats {
            nodes: self.nodes.len(),
            memo_hits: self.index.hits(),
            memo_misses: self.index.misses(),
        }
    }

    /// Consumes the machine, returning the graph rooted at `entry`.
    ///
    /// # Errors
    /// Returns an internal error if a node was allocated but never finished.
    pub fn into_graph(self, entry: NodeId) -> Result<NodeGraph> {
        let allocated = self.next_id as usize;
        if self.nodes.len() != allocated {
            return Err(Error::new(ErrorKind::Internal(format!(
                "{} of {allocated} nodes were never finished",
                allocated - self.nodes.len()
            ))));
        }
        Ok(NodeGraph::new(entry, self.nodes))
    }

    // --- rooms ---

    /// Visits `room` on a fork of the current state, optionally turning the
    /// reader first.
    ///
    /// # Errors
    /// Propagates any error raised while expanding the room.
    pub fn visit_room(&mut self, room: RoomId, facing: Option<Facing>) -> Result<NodeId> {
        let snapshot = self.state.snapshot();
        if let Some(facing) = facing {
            self.state.set_facing(facing);
        }
        let result = self.get_or_create(room);
        self.state.restore(snapshot);
        result
    }

    /// Returns the node for `room` under the current state, expanding it if
    /// no such node exists yet.
    ///
    /// The node is registered before its handler runs, so a path that comes
    /// back to the same room and state links to the node under construction
    /// instead of expanding it again.
    ///
    /// # Errors
    /// Propagates any error raised while running the room handler.
    pub fn get_or_create(&mut self, room: RoomId) -> Result<NodeId> {
        let hash = self.hash(Origin::Room(room), None)?;
        if let Some(id) = self.index.lookup(&hash) {
            tracing::trace!(room = room.0, node = id.0, "memo hit");
            return Ok(id);
        }

        let program = Arc::clone(&self.program);
        let compiled = program.room(room)?;
        let id = self.allocate();
        self.index.insert(hash, id);
        tracing::debug!(room = %compiled.name, node = id.0, hash = ?hash, "expanding room");

        self.chain.push(id);
        let result = self.expand_room(compiled);
        self.chain.pop();

        let body = result.map_err(|e| e.in_frame(format!("room {}", compiled.name)))?;
        let name = self.names.next(&room.slug());
        self.finish(id, name, room, body);
        Ok(id)
    }

    fn expand_room(&mut self, compiled: &CompiledRoom) -> Result<NodeBody> {
        self.state.enter_room(&compiled.name)?;
        let result = self.run_room(compiled);
        self.state.exit_room();
        result
    }

    fn run_room(&mut self, compiled: &CompiledRoom) -> Result<NodeBody> {
        let mut frame = Frame::new(compiled.id, Bindings::new());
        (compiled.body)(self, &mut frame)?;
        if let Some(state) = self.state.room(compiled.id) {
            frame.say(inventory_line(&state.items));
        }
        self.resolve(frame)
    }

    /// Follows a `goto` into `target`.
    ///
    /// # Errors
    /// Returns [`SemanticLimit::CyclicGoto`] if the target is a node still
    /// being expanded on the current inline chain.
    pub fn goto(&mut self, target: RoomId, facing: Option<Facing>) -> Result<NodeId> {
        let program = Arc::clone(&self.program);
        let name = &program.room(target)?.name;
        tracing::trace!(target = %name, "goto");
        let id = self.visit_room(target, facing)?;
        if self.chain.contains(&id) {
            return Err(Error::limit_exceeded(SemanticLimit::CyclicGoto {
                room: name.clone(),
            }));
        }
        Ok(id)
    }

    // --- options ---

    /// Resolves an option on a fork of the current state.
    ///
    /// Options are memoized after their body runs. An option that emits
    /// nothing and offers no choices resolves to its continuation directly.
    fn option_node(&mut self, handler: &CompiledOption, captured: Bindings) -> Result<NodeId> {
        let hash = self.hash(Origin::Option(handler.id), Some(&captured))?;
        if let Some(id) = self.index.lookup(&hash) {
            tracing::trace!(option = handler.id.0, node = id.0, "memo hit");
            return Ok(id);
        }

        let snapshot = self.state.snapshot();
        let result = self.run_option(handler, captured);
        self.state.restore(snapshot);
        let body = result?;

        // The body may have resolved this same option further down, for
        // example through a room that offers it again unchanged.
        if let Some(id) = self.index.get(&hash) {
            return Ok(id);
        }
        let id = match body.continuation {
            Some(next) if body.is_blank() => next,
            _ => {
                let id = self.allocate();
                tracing::debug!(option = handler.id.0, node = id.0, "expanded option");
                let name = self.names.next(&handler.id.slug());
                self.finish(id, name, handler.room, body);
                id
            }
        };
        Ok(self.index.insert(hash, id))
    }

    fn run_option(&mut self, handler: &CompiledOption, captured: Bindings) -> Result<NodeBody> {
        let mut frame = Frame::new(handler.room, captured);
        (handler.body)(self, &mut frame)?;
        if frame.continuation.is_none() {
            let next = self.visit_room(handler.room, None)?;
            frame.set_continuation(next);
        }
        self.resolve(frame)
    }

    /// Resolves the frame's pending choices into links.
    ///
    /// A choice is a page boundary, so the inline chain starts afresh for
    /// everything expanded beneath it.
    fn resolve(&mut self, frame: Frame) -> Result<NodeBody> {
        let Frame {
            text,
            pending,
            continuation,
            ..
        } = frame;
        let saved = std::mem::take(&mut self.chain);
        let result = self.resolve_choices(pending);
        self.chain = saved;

        let mut children = result?;
        children.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(NodeBody {
            text: text.join("\n\n"),
            children,
            continuation,
        })
    }

    fn resolve_choices(&mut self, pending: Vec<PendingChoice>) -> Result<Vec<Choice>> {
        let mut children = Vec::with_capacity(pending.len());
        for choice in pending {
            let (label, target) = match choice {
                PendingChoice::Option {
                    label,
                    handler,
                    captured,
                } => {
                    let target = self
                        .option_node(&handler, captured)
                        .map_err(|e| e.in_frame(format!("option \"{label}\"")))?;
                    (label, target)
                }
                PendingChoice::Direction {
                    label,
                    target,
                    facing,
                } => (label, self.visit_room(target, facing)?),
                PendingChoice::StartOver { label } => {
                    let entry = self.entry.ok_or_else(|| {
                        Error::new(ErrorKind::Internal("start-over before entry".to_string()))
                    })?;
                    (label, entry)
                }
            };
            children.push(Choice::new(label, target));
        }
        Ok(children)
    }

    // --- nodes ---

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.entry.get_or_insert(id);
        id
    }

    fn finish(&mut self, id: NodeId, name: String, room: RoomId, body: NodeBody) {
        self.nodes.insert(
            id,
            Node {
                id,
                name,
                room,
                text: body.text,
                children: body.children,
                continuation: body.continuation,
            },
        );
    }

    fn hash(&self, origin: Origin, captured: Option<&Bindings>) -> Result<ContentHash> {
        let bytes = self.state.canonical_bytes()?;
        ContentHash::compute(origin, self.state.facing(), &bytes, captured)
    }

    // --- evaluation services ---

    /// Reads a world binding.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnboundVariable`] if it was never set.
    pub fn world(&self, name: &str) -> Result<Value> {
        self.state
            .world(name)
            .cloned()
            .ok_or_else(|| Error::unbound_variable(format!("world.{name}")))
    }

    /// Reads a binding of `room`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnboundVariable`] if it was never set.
    pub fn room_var(&self, room: RoomId, name: &str) -> Result<Value> {
        self.state
            .room_var(room, name)
            .cloned()
            .ok_or_else(|| Error::unbound_variable(format!("room.{name}")))
    }

    /// Writes a world binding.
    pub fn set_world(&mut self, name: Arc<str>, value: Value) {
        self.state.set_world(name, value);
    }

    /// Writes a binding of `room`.
    pub fn set_room_var(&mut self, room: RoomId, name: Arc<str>, value: Value) {
        self.state.set_room_var(room, name, value);
    }

    /// Marks once-block `id` of `room` as fired. False if it already had.
    pub fn mark_once(&mut self, room: RoomId, id: u32) -> bool {
        self.state.mark_once(room, id)
    }

    /// Drops `item` into `room`.
    pub fn add_item(&mut self, room: RoomId, item: Item) {
        self.state.add_item(room, item);
    }

    /// Rolls dice on `room`'s stream.
    ///
    /// # Errors
    /// Returns an internal error for a room outside the arena.
    pub fn roll(&mut self, room: RoomId, dice: &DiceExpr) -> Result<i64> {
        let mut rng_state = self.state.rng_state(room)?;
        let mut rng = rng_state.stream();
        let roll = dice.roll(&mut rng);
        rng_state.advance_to(&rng);
        self.state.set_rng_state(room, rng_state);
        Ok(roll.total)
    }

    /// Calls a native function with `room`'s stream as its randomness.
    ///
    /// # Errors
    /// Propagates the function's error.
    pub fn call_native(
        &mut self,
        function: NativeFn,
        room: RoomId,
        args: &[Value],
    ) -> Result<Value> {
        let mut rng_state: RngState = self.state.rng_state(room)?;
        let mut host = HostCtx {
            rng: rng_state.stream(),
            state: &mut self.state,
        };
        let result = function.call(args, &mut host);
        rng_state.advance_to(&host.rng);
        self.state.set_rng_state(room, rng_state);
        result.map_err(|e| e.in_frame(format!("call {}", function.name)))
    }
}
