//! Deferred reference resolution.
//!
//! A reference whose target had not been built yet when the parser reached
//! it is recorded as a [`Link`]: the path of the slot holding the
//! placeholder, plus the target path. Once the whole document exists, the
//! queue is drained newest first and each slot is overwritten with a handle
//! to the target node.

use crate::path::Segment;
use crate::value::{Node, NodeId};
use crate::{Document, Error, Path, Result, Value};

/// A pending reference.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Link {
    /// Where the placeholder sits
    pub at: Path,
    /// What it refers to
    pub target: Path,
}

/// Looks up the most recently registered node built at `target`.
pub(crate) fn find(paths: &[(Path, NodeId)], target: &Path) -> Option<NodeId> {
    paths
        .iter()
        .rev()
        .find(|(path, _)| path == target)
        .map(|&(_, id)| id)
}

/// Resolves every queued link, newest first.
///
/// # Errors
///
/// Returns a linking error if a target was never built, or if the slot's
/// path does not lead to an existing member.
pub(crate) fn resolve(
    doc: &mut Document,
    paths: &[(Path, NodeId)],
    links: Vec<Link>,
) -> Result<()> {
    for link in links.into_iter().rev() {
        let id = find(paths, &link.target)
            .ok_or_else(|| Error::linking(&link.target.to_string(), "does not exist"))?;
        assign(doc, &link.at, Value::Node(id))?;
        log::trace!("linked {} -> {} ({})", link.at, link.target, id);
    }
    Ok(())
}

/// Walks `at` from the root and overwrites the member it names.
fn assign(doc: &mut Document, at: &Path, value: Value) -> Result<()> {
    let missing = || Error::linking(&at.to_string(), "does not exist");

    let Some((last, parents)) = at.segments().split_last() else {
        return Err(Error::linking(&at.to_string(), "cannot replace the document root"));
    };

    let mut current = doc.root().clone();
    for segment in parents {
        current = doc.child(&current, segment).cloned().ok_or_else(missing)?;
    }

    let node = current
        .as_node()
        .and_then(|id| doc.node_mut(id))
        .ok_or_else(missing)?;

    let slot = match (node, last) {
        (Node::Sequence(items), Segment::Index(i)) => items.get_mut(*i),
        (Node::Mapping(map), Segment::Key(key)) => map.get_mut(key),
        (Node::Tagged(tagged), Segment::Key(key)) => {
            if !tagged.has(key) {
                return Err(missing());
            }
            tagged.set(key, value);
            return Ok(());
        }
        (Node::Tagged(tagged), Segment::Index(i)) => match tagged.elements.as_mut() {
            Some(items) => items.get_mut(*i),
            None => match tagged.members.get(*i) {
                Some(member) => tagged.fields.get_mut(&member.field),
                None => None,
            },
        },
        _ => None,
    };

    let slot = slot.ok_or_else(missing)?;
    *slot = value;
    Ok(())
}
