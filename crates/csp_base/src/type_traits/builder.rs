use alloc::boxed::Box;
use alloc::vec::Vec;

use thiserror::Error;

use super::{
    Charset, MapTraits, PrimitiveKind, SequenceTraits, TraitsKind, TypeKey, TypeTraits,
};

// -----------------------------------------------------------------------------
// NodeKind

/// Kind of a node pushed into a [`TypeTraitsBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Primitive(PrimitiveKind),
    Array,
    Collection,
    Map,
    String,
    Object,
}

// -----------------------------------------------------------------------------
// Error

/// Misuse of a [`TypeTraitsBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TypeTraitsError {
    #[error("Primitive cannot be root")]
    PrimitiveRoot,

    #[error("Type traits are already built")]
    AlreadyBuilt,

    #[error("Type traits are not built to the end")]
    NotBuiltToTheEnd,

    #[error("No node was added")]
    Empty,

    #[error("There is no open node to modify")]
    NoCurrentNode,

    #[error("Property `{property}` is not applicable to a {node:?} node")]
    NotApplicable {
        property: &'static str,
        node: NodeKind,
    },

    #[error("Object node has no processor class")]
    MissingProcessorClazz,
}

// -----------------------------------------------------------------------------
// State

/// Progress of a [`TypeTraitsBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// Nothing was added yet.
    Ready,
    /// Some containers still wait for children.
    Building,
    /// The tree is complete, only [`TypeTraitsBuilder::build`] is allowed.
    Done,
}

#[derive(Debug)]
struct Pending {
    kind: NodeKind,
    reference: bool,
    fixed_size: Option<usize>,
    charset: Charset,
    clazz: Option<TypeKey>,
}

impl Pending {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            reference: false,
            fixed_size: None,
            charset: Charset::default(),
            clazz: None,
        }
    }

    fn finish(self, kind: TraitsKind) -> TypeTraits {
        TypeTraits {
            kind,
            reference: self.reference,
        }
    }

    fn leaf_kind(&self) -> Result<TraitsKind, TypeTraitsError> {
        match self.kind {
            NodeKind::Primitive(primitive) => Ok(TraitsKind::Primitive(primitive)),
            NodeKind::String => Ok(TraitsKind::String(self.charset)),
            NodeKind::Object => match &self.clazz {
                Some(key) => Ok(TraitsKind::Object(key.clone())),
                None => Err(TypeTraitsError::MissingProcessorClazz),
            },
            NodeKind::Array | NodeKind::Collection | NodeKind::Map => {
                Err(TypeTraitsError::NotBuiltToTheEnd)
            }
        }
    }
}

/// An open container waiting for its children.
#[derive(Debug)]
enum Frame {
    Sequence(Pending),
    MapKey(Pending),
    MapValue(Pending, TypeTraits),
}

// -----------------------------------------------------------------------------
// TypeTraitsBuilder

/// Incremental builder of a [`TypeTraits`] tree.
///
/// Nodes are added in pre-order: a container first, then its element (or its
/// key and then its value for maps). Properties apply to the node added last
/// and must be set before the next [`add_node`](Self::add_node). Containers
/// close automatically once all their children are present.
///
/// # Examples
///
/// ```
/// use csp_base::type_traits::{
///     Charset, NodeKind, PrimitiveKind, TypeTraits, TypeTraitsBuilder,
/// };
///
/// // Collection<Map<String, i32[4]>> behind a pointer.
/// let mut builder = TypeTraitsBuilder::new();
/// builder
///     .add_node(NodeKind::Collection)?
///     .set_reference()?
///     .add_node(NodeKind::Map)?
///     .add_node(NodeKind::String)?
///     .set_charset(Charset::Utf16Le)?
///     .add_node(NodeKind::Array)?
///     .set_fixed_size(4)?
///     .add_node(NodeKind::Primitive(PrimitiveKind::I32))?;
/// let traits = builder.build()?;
///
/// let expected = TypeTraits::collection(TypeTraits::map(
///     TypeTraits::string(Charset::Utf16Le),
///     TypeTraits::fixed_array(TypeTraits::primitive(PrimitiveKind::I32), 4),
/// ))
/// .as_reference();
/// assert_eq!(traits, expected);
/// # Ok::<(), csp_base::type_traits::TypeTraitsError>(())
/// ```
#[derive(Debug)]
pub struct TypeTraitsBuilder {
    stack: Vec<Frame>,
    current: Option<Pending>,
    root: Option<TypeTraits>,
    state: BuilderState,
}

impl TypeTraitsBuilder {
    pub const fn new() -> Self {
        Self {
            stack: Vec::new(),
            current: None,
            root: None,
            state: BuilderState::Ready,
        }
    }

    #[inline]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Adds a node as the next missing child of the innermost open container.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<&mut Self, TypeTraitsError> {
        if self.state == BuilderState::Done {
            return Err(TypeTraitsError::AlreadyBuilt);
        }
        self.commit()?;
        if self.state == BuilderState::Done {
            return Err(TypeTraitsError::AlreadyBuilt);
        }
        if self.stack.is_empty() && matches!(kind, NodeKind::Primitive(_)) {
            return Err(TypeTraitsError::PrimitiveRoot);
        }

        self.current = Some(Pending::new(kind));
        self.state = BuilderState::Building;
        Ok(self)
    }

    fn current(&mut self) -> Result<&mut Pending, TypeTraitsError> {
        match self.current.as_mut() {
            Some(pending) => Ok(pending),
            None if self.state == BuilderState::Done => Err(TypeTraitsError::AlreadyBuilt),
            None => Err(TypeTraitsError::NoCurrentNode),
        }
    }

    /// Marks the current node as a reference.
    pub fn set_reference(&mut self) -> Result<&mut Self, TypeTraitsError> {
        let pending = self.current()?;
        if let NodeKind::Primitive(_) = pending.kind {
            return Err(TypeTraitsError::NotApplicable {
                property: "reference",
                node: pending.kind,
            });
        }
        pending.reference = true;
        Ok(self)
    }

    /// Fixes the length of the current array or collection.
    pub fn set_fixed_size(&mut self, len: usize) -> Result<&mut Self, TypeTraitsError> {
        let pending = self.current()?;
        if !matches!(pending.kind, NodeKind::Array | NodeKind::Collection) {
            return Err(TypeTraitsError::NotApplicable {
                property: "fixed_size",
                node: pending.kind,
            });
        }
        pending.fixed_size = Some(len);
        Ok(self)
    }

    /// Sets the charset of the current string node.
    pub fn set_charset(&mut self, charset: Charset) -> Result<&mut Self, TypeTraitsError> {
        let pending = self.current()?;
        if pending.kind != NodeKind::String {
            return Err(TypeTraitsError::NotApplicable {
                property: "charset",
                node: pending.kind,
            });
        }
        pending.charset = charset;
        Ok(self)
    }

    /// Sets the declaring type whose processor handles the current object node.
    pub fn set_processor_clazz(
        &mut self,
        key: impl Into<TypeKey>,
    ) -> Result<&mut Self, TypeTraitsError> {
        let pending = self.current()?;
        if pending.kind != NodeKind::Object {
            return Err(TypeTraitsError::NotApplicable {
                property: "processor_clazz",
                node: pending.kind,
            });
        }
        pending.clazz = Some(key.into());
        Ok(self)
    }

    /// Returns the finished tree.
    ///
    /// Fails with [`TypeTraitsError::NotBuiltToTheEnd`] while containers still
    /// wait for children. The builder stays [`BuilderState::Done`] afterwards.
    pub fn build(&mut self) -> Result<TypeTraits, TypeTraitsError> {
        match self.state {
            BuilderState::Ready => Err(TypeTraitsError::Empty),
            BuilderState::Done => self.root.take().ok_or(TypeTraitsError::AlreadyBuilt),
            BuilderState::Building => {
                self.commit()?;
                if self.state != BuilderState::Done {
                    return Err(TypeTraitsError::NotBuiltToTheEnd);
                }
                self.root.take().ok_or(TypeTraitsError::AlreadyBuilt)
            }
        }
    }

    /// Moves the current node into the tree.
    ///
    /// An incomplete leaf stays current, so it can still be fixed.
    fn commit(&mut self) -> Result<(), TypeTraitsError> {
        let Some(pending) = self.current.take() else {
            return Ok(());
        };
        match pending.kind {
            NodeKind::Array | NodeKind::Collection => {
                self.stack.push(Frame::Sequence(pending));
                Ok(())
            }
            NodeKind::Map => {
                self.stack.push(Frame::MapKey(pending));
                Ok(())
            }
            _ => match pending.leaf_kind() {
                Ok(kind) => {
                    self.attach(pending.finish(kind));
                    Ok(())
                }
                Err(err) => {
                    self.current = Some(pending);
                    Err(err)
                }
            },
        }
    }

    /// Attaches a complete node, closing every container it completes.
    fn attach(&mut self, mut node: TypeTraits) {
        loop {
            match self.stack.pop() {
                None => {
                    self.root = Some(node);
                    self.state = BuilderState::Done;
                    return;
                }
                Some(Frame::MapKey(pending)) => {
                    self.stack.push(Frame::MapValue(pending, node));
                    return;
                }
                Some(Frame::MapValue(pending, key)) => {
                    let map = MapTraits {
                        key: Box::new(key),
                        value: Box::new(node),
                    };
                    node = pending.finish(TraitsKind::Map(map));
                }
                Some(Frame::Sequence(pending)) => {
                    let sequence = SequenceTraits {
                        element: Box::new(node),
                        fixed_size: pending.fixed_size,
                    };
                    node = if pending.kind == NodeKind::Collection {
                        pending.finish(TraitsKind::Collection(sequence))
                    } else {
                        pending.finish(TraitsKind::Array(sequence))
                    };
                }
            }
        }
    }
}

impl Default for TypeTraitsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests
